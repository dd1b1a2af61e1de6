//! Cleaner stage: detects missing values and suggests fixes.

use std::collections::BTreeMap;

use tracing::debug;

use crate::context::{ContextValue, StageContext, keys};
use crate::error::{PipelineError, Result};
use crate::pipeline::StageEnv;

pub(crate) fn run(ctx: &mut StageContext, _env: &StageEnv<'_>) -> Result<String> {
    let df = ctx.frame(keys::DATASET).ok_or_else(|| PipelineError::StageFailed {
        stage: "cleaner".to_string(),
        reason: "dataset missing from context".to_string(),
    })?;

    // One pass over the columns: count nulls for every column and keep a
    // suggestion per affected column, in frame order.
    let mut null_summary = BTreeMap::new();
    let mut suggestions = Vec::new();
    for col in df.get_columns() {
        let nulls = col.null_count();
        null_summary.insert(col.name().to_string(), nulls);
        if nulls > 0 {
            suggestions.push(format!("Fill missing values in {}", col.name()));
        }
    }
    debug!(
        "Null scan: {} columns, {} with missing values",
        null_summary.len(),
        suggestions.len()
    );

    let count = suggestions.len();
    ctx.set(keys::NULL_SUMMARY, ContextValue::Counts(null_summary));
    ctx.set(keys::CLEANING_SUGGESTIONS, ContextValue::List(suggestions));

    Ok(format!("{count} cleaning suggestions"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn run_cleaner(ctx: &mut StageContext) -> Result<String> {
        let env = StageEnv {
            input: Path::new("unused.csv"),
            source_name: "unused.csv",
            llm: None,
        };
        run(ctx, &env)
    }

    #[test]
    fn test_null_summary_covers_every_column() {
        let df = df![
            "id" => [Some(1i64), Some(2), Some(3)],
            "amount" => [Some(10i64), None, Some(30)],
            "city" => [Some("York"), Some("Leeds"), None],
        ]
        .unwrap();
        let mut ctx = StageContext::new();
        ctx.set(keys::DATASET, ContextValue::Frame(df));

        let output = run_cleaner(&mut ctx).unwrap();
        assert_eq!(output, "2 cleaning suggestions");

        let nulls = ctx.counts(keys::NULL_SUMMARY).unwrap();
        assert_eq!(nulls.len(), 3);
        assert_eq!(nulls["id"], 0);
        assert_eq!(nulls["amount"], 1);
        assert_eq!(nulls["city"], 1);

        let suggestions = ctx.list(keys::CLEANING_SUGGESTIONS).unwrap();
        assert_eq!(
            suggestions,
            &[
                "Fill missing values in amount".to_string(),
                "Fill missing values in city".to_string(),
            ]
        );
    }

    #[test]
    fn test_clean_dataset_has_no_suggestions() {
        let df = df!["id" => [1i64, 2, 3]].unwrap();
        let mut ctx = StageContext::new();
        ctx.set(keys::DATASET, ContextValue::Frame(df));

        let output = run_cleaner(&mut ctx).unwrap();
        assert_eq!(output, "0 cleaning suggestions");
        assert!(ctx.list(keys::CLEANING_SUGGESTIONS).unwrap().is_empty());
        assert_eq!(ctx.counts(keys::NULL_SUMMARY).unwrap()["id"], 0);
    }

    #[test]
    fn test_missing_dataset_fails_stage() {
        let mut ctx = StageContext::new();
        let err = run_cleaner(&mut ctx).unwrap_err();
        assert_eq!(err.error_code(), "STAGE_FAILED");
    }
}
