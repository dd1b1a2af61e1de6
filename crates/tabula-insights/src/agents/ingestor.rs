//! Ingestor stage: loads the uploaded CSV into a DataFrame.
//!
//! This is the only fatal stage. Real-world CSV exports are frequently
//! malformed, so loading tries progressively more lenient strategies
//! before giving up.

use std::path::Path;

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use tracing::{debug, error};

use crate::context::{ContextValue, StageContext, keys};
use crate::error::{PipelineError, Result};
use crate::pipeline::StageEnv;

/// Number of rows used for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

pub(crate) fn run(ctx: &mut StageContext, env: &StageEnv<'_>) -> Result<String> {
    let df = read_dataset(env.input).map_err(|e| PipelineError::IngestFailed(e.to_string()))?;

    if df.width() == 0 {
        return Err(PipelineError::IngestFailed(
            "dataset has no columns".to_string(),
        ));
    }

    let rows = df.height();
    let columns = df.width();
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    debug!("Loaded dataset: {} rows x {} columns", rows, columns);

    ctx.set(keys::FILENAME, ContextValue::Text(env.source_name.to_string()));
    ctx.set(keys::ROW_COUNT, ContextValue::Count(rows));
    ctx.set(keys::COLUMN_COUNT, ContextValue::Count(columns));
    ctx.set(keys::COLUMN_NAMES, ContextValue::List(column_names));
    ctx.set(keys::DATASET, ContextValue::Frame(df));

    Ok(format!("{rows} rows loaded"))
}

/// Load a CSV with fallback strategies for messy files.
fn read_dataset(path: &Path) -> Result<DataFrame> {
    use std::path::PathBuf;

    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: Pre-clean content
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cleaned = clean_csv_content(&content);
            use std::io::Cursor;
            let cursor = Cursor::new(cleaned);

            CsvReadOptions::default()
                .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
                .with_has_header(true)
                .into_reader_with_file_handle(cursor)
                .finish()
                .map_err(|e| e.into())
        }
        Err(e) => {
            error!("Could not read file: {}", e);
            Err(e.into())
        }
    }
}

/// Collapse stray double-quoting and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
