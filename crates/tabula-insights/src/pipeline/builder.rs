//! Pipeline construction and end-to-end processing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use static_assertions::assert_impl_all;
use tracing::{error, info};

use super::runner::PipelineRunner;
use super::stage::StageEnv;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::llm::LlmProvider;
use crate::report::{Report, ReportStore, html};

/// Everything one processed dataset produced.
#[derive(Debug)]
pub struct Analysis {
    /// The structured report.
    pub report: Report,
    /// The rendered HTML document.
    pub html: String,
    /// Where the document was persisted, `None` when saving is disabled
    /// or the store failed (the failure is logged, not propagated).
    pub saved_path: Option<PathBuf>,
}

/// The configured insight pipeline.
///
/// A pipeline is immutable once built and safe to share: every call to
/// [`Pipeline::process`] runs over its own context, so concurrent runs
/// do not interfere.
///
/// # Example
///
/// ```rust,ignore
/// use tabula_insights::{Pipeline, PipelineConfig};
///
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::builder().reports_dir("output").build()?)
///     .build()?;
/// let analysis = pipeline.process("data/orders.csv".as_ref(), "orders.csv")?;
/// println!("report: {}", analysis.report.report_id);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    llm: Option<Arc<dyn LlmProvider>>,
    runner: PipelineRunner,
    store: ReportStore,
}

// The pipeline is shared across HTTP workers.
assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a builder for constructing a pipeline.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &ReportStore {
        &self.store
    }

    /// Run the full pipeline over one CSV file.
    ///
    /// `source_name` is the upload's base name; it becomes the report's
    /// source filename and seeds the report id.
    ///
    /// A fatal ingest failure returns `Err` and no report is created.
    /// Failures in later stages are recorded in the report instead. A
    /// report-store failure is logged and the in-memory report is still
    /// returned.
    pub fn process(&self, input: &Path, source_name: &str) -> Result<Analysis> {
        let started = Local::now();
        let llm = if self.config.use_language_model {
            self.llm.as_deref()
        } else {
            None
        };
        let env = StageEnv {
            input,
            source_name,
            llm,
        };

        let mut outcome = self.runner.run(&env);
        if let Some(err) = outcome.fatal.take() {
            error!("Pipeline aborted: {err}");
            return Err(err);
        }

        let report_id = self.store.allocate_id(source_name, started);
        let report = Report::synthesize(&outcome, source_name, report_id, started);
        let html = html::render(&report);

        let saved_path = if self.config.save_reports {
            match self.store.save(&report.report_id, &html) {
                Ok(path) => {
                    info!("Report saved to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    error!("Failed to persist report '{}': {e}", report.report_id);
                    None
                }
            }
        } else {
            None
        };

        Ok(Analysis {
            report,
            html,
            saved_path,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    llm: Option<Arc<dyn LlmProvider>>,
}

assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Inject the language model used by the summarizer.
    pub fn llm_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(provider);
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let store = ReportStore::new(config.reports_dir.clone());

        Ok(Pipeline {
            config,
            llm: self.llm,
            runner: PipelineRunner::new(),
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config().reports_dir, PathBuf::from("output"));
        assert!(pipeline.llm.is_none());
        assert_eq!(pipeline.store().root(), Path::new("output"));
    }

    #[test]
    fn test_builder_uses_config_reports_dir() {
        let config = PipelineConfig::builder()
            .reports_dir("archive")
            .save_reports(false)
            .build()
            .unwrap();
        let pipeline = Pipeline::builder().config(config).build().unwrap();
        assert_eq!(pipeline.store().root(), Path::new("archive"));
        assert!(!pipeline.config().save_reports);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = PipelineConfig {
            reports_dir: PathBuf::new(),
            ..PipelineConfig::default()
        };
        let result = Pipeline::builder().config(config).build();
        assert!(matches!(result, Err(ConfigValidationError::EmptyReportsDir)));
    }
}
