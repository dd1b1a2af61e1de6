//! Analyzer stage: descriptive statistics for numeric columns.

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::debug;

use crate::context::{ColumnStats, ContextValue, StageContext, keys};
use crate::error::{PipelineError, Result, ResultExt};
use crate::pipeline::StageEnv;

pub(crate) fn run(ctx: &mut StageContext, _env: &StageEnv<'_>) -> Result<String> {
    let df = ctx.frame(keys::DATASET).ok_or_else(|| PipelineError::StageFailed {
        stage: "analyzer".to_string(),
        reason: "dataset missing from context".to_string(),
    })?;

    let mut stats = BTreeMap::new();
    for col in df.get_columns() {
        if !is_numeric_dtype(col.dtype()) {
            continue;
        }
        let summary = summarize_column(col.as_materialized_series())?;
        stats.insert(col.name().to_string(), summary);
    }
    debug!("Computed statistics for {} numeric columns", stats.len());

    // An empty map is a valid result: the dataset simply has no numeric
    // columns. The summarizer degrades accordingly.
    ctx.set(keys::COLUMN_STATS, ContextValue::Stats(stats));

    Ok("Statistical analysis completed".to_string())
}

fn summarize_column(series: &Series) -> Result<ColumnStats> {
    let non_null = series.len() - series.null_count();
    if non_null == 0 {
        return Ok(ColumnStats {
            count: 0,
            mean: None,
            sum: None,
            min: None,
            max: None,
        });
    }

    let values = series
        .cast(&DataType::Float64)
        .context(format!("Casting column '{}' for statistics", series.name()))?;
    let values = values.f64()?;

    Ok(ColumnStats {
        count: non_null as u64,
        mean: values.mean().map(round2),
        sum: values.sum().map(round2),
        min: values.min().map(round2),
        max: values.max().map(round2),
    })
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
