//! The structured report synthesized from a pipeline run.
//!
//! Synthesis is pure: the clock and the report id are injected by the
//! caller, and every value comes from the run's outcome. Rendering to
//! HTML lives in [`super::html`].

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::context::{ColumnStats, keys};
use crate::pipeline::{PipelineOutcome, StageResult};

/// Shape of the ingested dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

/// Everything a finished (possibly partial) run produced.
///
/// Fields sourced from stages that failed or were skipped are `None`;
/// the renderer and the API both show explicit placeholders for those.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub report_id: String,
    pub source_filename: String,
    /// Local timestamp, formatted `%Y-%m-%d %H:%M:%S`.
    pub created_at: String,
    pub summary_text: Option<String>,
    pub dataset: Option<DatasetOverview>,
    pub stage_results: Vec<StageResult>,
    pub null_summary: Option<BTreeMap<String, usize>>,
    pub cleaning_suggestions: Option<Vec<String>>,
    pub column_stats: Option<BTreeMap<String, ColumnStats>>,
}

impl Report {
    /// Build a report from a run outcome.
    ///
    /// Works for partial pipelines: whatever the context is missing
    /// simply stays `None`.
    pub fn synthesize(
        outcome: &PipelineOutcome,
        source_filename: &str,
        report_id: String,
        generated_at: DateTime<Local>,
    ) -> Self {
        let ctx = &outcome.context;

        let dataset = match (
            ctx.count(keys::ROW_COUNT),
            ctx.count(keys::COLUMN_COUNT),
            ctx.list(keys::COLUMN_NAMES),
        ) {
            (Some(rows), Some(columns), Some(names)) => Some(DatasetOverview {
                rows,
                columns,
                column_names: names.to_vec(),
            }),
            _ => None,
        };

        Report {
            report_id,
            source_filename: source_filename.to_string(),
            created_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            summary_text: ctx.text(keys::SUMMARY_TEXT).map(str::to_string),
            dataset,
            stage_results: outcome.results.clone(),
            null_summary: ctx.counts(keys::NULL_SUMMARY).cloned(),
            cleaning_suggestions: ctx.list(keys::CLEANING_SUGGESTIONS).map(<[String]>::to_vec),
            column_stats: ctx.stats(keys::COLUMN_STATS).cloned(),
        }
    }

    /// Number of stages that completed.
    pub fn completed_steps(&self) -> usize {
        self.stage_results
            .iter()
            .filter(|r| r.is_completed())
            .count()
    }

    /// Column names in frame order when known, otherwise the keys of
    /// `map` in its own order. Keeps tables aligned with the source CSV.
    pub(crate) fn ordered_columns<'a, V>(&'a self, map: &'a BTreeMap<String, V>) -> Vec<&'a String> {
        match &self.dataset {
            Some(d) => d
                .column_names
                .iter()
                .filter(|name| map.contains_key(*name))
                .collect(),
            None => map.keys().collect(),
        }
    }

    /// The `data_info` block of the insights payload.
    pub fn data_info(&self) -> Value {
        match &self.dataset {
            Some(d) => json!({
                "filename": self.source_filename,
                "rows": d.rows,
                "columns": d.columns,
                "column_names": d.column_names,
            }),
            None => Value::Null,
        }
    }

    /// The `cleaning_info` block: null counts and suggestions, `null`
    /// for a section whose stage never completed.
    pub fn cleaning_info(&self) -> Value {
        json!({
            "null_summary": self.null_summary,
            "suggestions": self.cleaning_suggestions,
        })
    }

    /// The `analysis_results` block: per-column statistics or `null`.
    pub fn analysis_results(&self) -> Value {
        json!(self.column_stats)
    }

    /// The combined insights object served by the API and embedded in
    /// the technical section of the HTML report.
    pub fn insights(&self) -> Value {
        json!({
            "data_info": self.data_info(),
            "cleaning_info": self.cleaning_info(),
            "analysis_results": self.analysis_results(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextValue, StageContext};
    use crate::pipeline::{STAGES, StageResult};
    use pretty_assertions::assert_eq;

    fn outcome_with(context: StageContext, results: Vec<StageResult>) -> PipelineOutcome {
        PipelineOutcome {
            results,
            context,
            fatal: None,
        }
    }

    fn fixed_time() -> DateTime<Local> {
        use chrono::TimeZone;
        Local.with_ymd_and_hms(2024, 3, 1, 14, 30, 5).unwrap()
    }

    fn full_context() -> StageContext {
        let mut ctx = StageContext::new();
        ctx.set(keys::ROW_COUNT, ContextValue::Count(3));
        ctx.set(keys::COLUMN_COUNT, ContextValue::Count(2));
        ctx.set(
            keys::COLUMN_NAMES,
            ContextValue::List(vec!["id".to_string(), "amount".to_string()]),
        );
        ctx.set(
            keys::NULL_SUMMARY,
            ContextValue::Counts(
                [("id".to_string(), 0), ("amount".to_string(), 1)]
                    .into_iter()
                    .collect(),
            ),
        );
        ctx.set(
            keys::CLEANING_SUGGESTIONS,
            ContextValue::List(vec!["Fill missing values in amount".to_string()]),
        );
        ctx.set(
            keys::COLUMN_STATS,
            ContextValue::Stats(
                [(
                    "amount".to_string(),
                    ColumnStats {
                        count: 2,
                        mean: Some(20.0),
                        sum: Some(40.0),
                        min: Some(10.0),
                        max: Some(30.0),
                    },
                )]
                .into_iter()
                .collect(),
            ),
        );
        ctx.set(
            keys::SUMMARY_TEXT,
            ContextValue::Text("A short summary.".to_string()),
        );
        ctx
    }

    #[test]
    fn test_synthesize_full_run() {
        let results: Vec<StageResult> = STAGES
            .iter()
            .map(|s| StageResult::completed(s, "done"))
            .collect();
        let outcome = outcome_with(full_context(), results);

        let report = Report::synthesize(&outcome, "orders.csv", "orders_x".to_string(), fixed_time());

        assert_eq!(report.report_id, "orders_x");
        assert_eq!(report.source_filename, "orders.csv");
        assert_eq!(report.created_at, "2024-03-01 14:30:05");
        assert_eq!(report.summary_text.as_deref(), Some("A short summary."));
        assert_eq!(report.completed_steps(), 4);

        let dataset = report.dataset.as_ref().unwrap();
        assert_eq!(dataset.rows, 3);
        assert_eq!(dataset.column_names, vec!["id", "amount"]);
        assert_eq!(report.null_summary.as_ref().unwrap()["amount"], 1);
    }

    #[test]
    fn test_synthesize_partial_run_leaves_gaps() {
        // Only the ingest keys are present, as if cleaner and analyzer failed.
        let mut ctx = StageContext::new();
        ctx.set(keys::ROW_COUNT, ContextValue::Count(3));
        ctx.set(keys::COLUMN_COUNT, ContextValue::Count(2));
        ctx.set(
            keys::COLUMN_NAMES,
            ContextValue::List(vec!["id".to_string(), "amount".to_string()]),
        );
        let outcome = outcome_with(ctx, vec![]);

        let report = Report::synthesize(&outcome, "orders.csv", "orders_x".to_string(), fixed_time());

        assert!(report.dataset.is_some());
        assert!(report.summary_text.is_none());
        assert!(report.null_summary.is_none());
        assert!(report.column_stats.is_none());

        let insights = report.insights();
        assert!(insights["analysis_results"].is_null());
        assert!(insights["cleaning_info"]["null_summary"].is_null());
        assert_eq!(insights["data_info"]["rows"], 3);
    }

    #[test]
    fn test_insights_shape() {
        let results: Vec<StageResult> = STAGES
            .iter()
            .map(|s| StageResult::completed(s, "done"))
            .collect();
        let outcome = outcome_with(full_context(), results);
        let report = Report::synthesize(&outcome, "orders.csv", "orders_x".to_string(), fixed_time());

        let insights = report.insights();
        assert_eq!(insights["data_info"]["filename"], "orders.csv");
        assert_eq!(insights["cleaning_info"]["null_summary"]["amount"], 1);
        assert_eq!(
            insights["cleaning_info"]["suggestions"][0],
            "Fill missing values in amount"
        );
        assert_eq!(insights["analysis_results"]["amount"]["mean"], 20.0);
        assert!(insights["analysis_results"]["amount"]["count"].is_u64());
    }

    #[test]
    fn test_ordered_columns_follow_frame_order() {
        let results = vec![];
        let outcome = outcome_with(full_context(), results);
        let report = Report::synthesize(&outcome, "orders.csv", "orders_x".to_string(), fixed_time());

        // BTreeMap order would be amount, id; frame order is id, amount.
        let nulls = report.null_summary.clone().unwrap();
        let ordered: Vec<&String> = report.ordered_columns(&nulls);
        assert_eq!(ordered, vec!["id", "amount"]);
    }
}
