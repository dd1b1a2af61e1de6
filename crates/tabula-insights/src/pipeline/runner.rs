//! Ordered execution of the stage table.

use static_assertions::assert_impl_all;
use tracing::{error, info, warn};

use super::stage::{STAGES, StageEnv, StageResult, StageSpec};
use crate::context::StageContext;
use crate::error::PipelineError;

/// Executes a stage table over a fresh context.
///
/// The runner owns the failure policy: a missing precondition skips the
/// stage, a failed non-fatal stage is recorded and the run continues, and
/// a failed fatal stage stops the loop and carries its error out.
pub struct PipelineRunner {
    stages: &'static [StageSpec],
}

assert_impl_all!(PipelineRunner: Send, Sync);

impl Default for PipelineRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRunner {
    /// Create a runner over the standard four-stage table.
    pub fn new() -> Self {
        Self { stages: &STAGES }
    }

    /// Create a runner over a custom stage table.
    pub fn with_stages(stages: &'static [StageSpec]) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &'static [StageSpec] {
        self.stages
    }

    /// Run every stage in order against a fresh context.
    ///
    /// Always returns an outcome with exactly one [`StageResult`] per
    /// stage that was reached; stages after a fatal failure are not
    /// recorded because the run ends there.
    pub fn run(&self, env: &StageEnv<'_>) -> PipelineOutcome {
        let mut context = StageContext::new();
        let mut results = Vec::with_capacity(self.stages.len());
        let mut fatal = None;

        info!("Starting insight pipeline for '{}'...", env.source_name);

        for (index, spec) in self.stages.iter().enumerate() {
            if let Some(missing) = spec.requires.iter().find(|key| !context.has(key)) {
                let reason = format!(
                    "Required key '{}' is missing (expected from the '{}' stage)",
                    missing,
                    self.producer_of(missing)
                );
                warn!("Step {}: Skipping {} ({})", index + 1, spec.name, reason);
                results.push(StageResult::skipped(spec, reason));
                continue;
            }

            info!("Step {}: {}", index + 1, spec.description);
            match (spec.run)(&mut context, env) {
                Ok(output) => {
                    info!("Step {}: {} completed ({})", index + 1, spec.name, output);
                    results.push(StageResult::completed(spec, output));
                }
                Err(e) => {
                    error!("Step {}: {} failed: {}", index + 1, spec.name, e);
                    results.push(StageResult::failed(spec, e.to_string()));
                    if spec.fatal {
                        fatal = Some(e);
                        break;
                    }
                }
            }
        }

        PipelineOutcome {
            results,
            context,
            fatal,
        }
    }

    /// Name of the stage whose `provides` covers `key`.
    fn producer_of(&self, key: &str) -> &'static str {
        self.stages
            .iter()
            .find(|s| s.provides.contains(&key))
            .map(|s| s.name)
            .unwrap_or("unknown")
    }
}

/// Everything a run produced: per-stage results, the final context, and
/// the fatal error if the run was aborted.
pub struct PipelineOutcome {
    pub results: Vec<StageResult>,
    pub context: StageContext,
    pub fatal: Option<PipelineError>,
}

impl PipelineOutcome {
    /// True when every reached stage completed and nothing was fatal.
    pub fn succeeded(&self) -> bool {
        self.fatal.is_none() && self.results.iter().all(StageResult::is_completed)
    }

    /// The recorded result for a stage, if it was reached.
    pub fn result_for(&self, name: &str) -> Option<&StageResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Number of completed stages.
    pub fn completed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_completed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextValue, keys};
    use crate::error::Result;
    use crate::pipeline::stage::StageStatus;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    // ========================================================================
    // Test stage functions
    // ========================================================================

    fn provide_dataset_marker(ctx: &mut StageContext, _env: &StageEnv<'_>) -> Result<String> {
        ctx.set(keys::ROW_COUNT, ContextValue::Count(5));
        Ok("5 rows loaded".to_string())
    }

    fn always_fails(_ctx: &mut StageContext, _env: &StageEnv<'_>) -> Result<String> {
        Err(PipelineError::StageFailed {
            stage: "broken".to_string(),
            reason: "synthetic failure".to_string(),
        })
    }

    fn ingest_fails(_ctx: &mut StageContext, _env: &StageEnv<'_>) -> Result<String> {
        Err(PipelineError::IngestFailed("file is not valid CSV".to_string()))
    }

    fn needs_rows(ctx: &mut StageContext, _env: &StageEnv<'_>) -> Result<String> {
        let rows = ctx.count(keys::ROW_COUNT).unwrap_or(0);
        Ok(format!("saw {rows} rows"))
    }

    fn run_table(stages: &'static [StageSpec]) -> PipelineOutcome {
        let env = StageEnv {
            input: Path::new("unused.csv"),
            source_name: "unused.csv",
            llm: None,
        };
        PipelineRunner::with_stages(stages).run(&env)
    }

    // ========================================================================
    // Runner behavior
    // ========================================================================

    #[test]
    fn test_all_stages_complete_in_order() {
        static TABLE: [StageSpec; 2] = [
            StageSpec {
                name: "first",
                description: "Provides the row count.",
                requires: &[],
                provides: &[keys::ROW_COUNT],
                fatal: true,
                run: provide_dataset_marker,
            },
            StageSpec {
                name: "second",
                description: "Consumes the row count.",
                requires: &[keys::ROW_COUNT],
                provides: &[],
                fatal: false,
                run: needs_rows,
            },
        ];

        let outcome = run_table(&TABLE);
        assert!(outcome.succeeded());
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.results[0].output.as_deref(), Some("5 rows loaded"));
        assert_eq!(outcome.results[1].output.as_deref(), Some("saw 5 rows"));
        assert_eq!(outcome.completed_count(), 2);
    }

    #[test]
    fn test_non_fatal_failure_continues_run() {
        static TABLE: [StageSpec; 3] = [
            StageSpec {
                name: "first",
                description: "Provides the row count.",
                requires: &[],
                provides: &[keys::ROW_COUNT],
                fatal: true,
                run: provide_dataset_marker,
            },
            StageSpec {
                name: "flaky",
                description: "Always fails.",
                requires: &[keys::ROW_COUNT],
                provides: &[keys::NULL_SUMMARY],
                fatal: false,
                run: always_fails,
            },
            StageSpec {
                name: "last",
                description: "Still runs after the failure.",
                requires: &[keys::ROW_COUNT],
                provides: &[],
                fatal: false,
                run: needs_rows,
            },
        ];

        let outcome = run_table(&TABLE);
        assert!(outcome.fatal.is_none());
        assert!(!outcome.succeeded());
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.result_for("flaky").unwrap().status, StageStatus::Failed);
        assert_eq!(outcome.result_for("last").unwrap().status, StageStatus::Completed);
    }

    #[test]
    fn test_missing_precondition_skips_and_names_producer() {
        static TABLE: [StageSpec; 3] = [
            StageSpec {
                name: "first",
                description: "Provides the row count.",
                requires: &[],
                provides: &[keys::ROW_COUNT],
                fatal: true,
                run: provide_dataset_marker,
            },
            StageSpec {
                name: "flaky",
                description: "Fails, so its output never appears.",
                requires: &[],
                provides: &[keys::COLUMN_STATS],
                fatal: false,
                run: always_fails,
            },
            StageSpec {
                name: "downstream",
                description: "Needs the flaky stage's output.",
                requires: &[keys::COLUMN_STATS],
                provides: &[],
                fatal: false,
                run: needs_rows,
            },
        ];

        let outcome = run_table(&TABLE);
        let skipped = outcome.result_for("downstream").unwrap();
        assert_eq!(skipped.status, StageStatus::Skipped);
        let reason = skipped.error_message.as_deref().unwrap();
        assert!(reason.contains(keys::COLUMN_STATS));
        assert!(reason.contains("flaky"));
        // A skipped stage is still present exactly once in the results.
        assert_eq!(outcome.results.len(), 3);
    }

    #[test]
    fn test_fatal_failure_stops_the_run() {
        static TABLE: [StageSpec; 2] = [
            StageSpec {
                name: "ingest",
                description: "Fails fatally.",
                requires: &[],
                provides: &[keys::ROW_COUNT],
                fatal: true,
                run: ingest_fails,
            },
            StageSpec {
                name: "never",
                description: "Must not be reached.",
                requires: &[],
                provides: &[],
                fatal: false,
                run: needs_rows,
            },
        ];

        let outcome = run_table(&TABLE);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].status, StageStatus::Failed);
        let fatal = outcome.fatal.as_ref().unwrap();
        assert_eq!(fatal.error_code(), "INGEST_FAILED");
        assert!(outcome.result_for("never").is_none());
    }
}
