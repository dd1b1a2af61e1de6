//! Configuration for the insight pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when validating a pipeline configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("Reports directory must not be empty")]
    EmptyReportsDir,

    #[error("Default dataset path must not be empty")]
    EmptyDefaultDataset,
}

/// Configuration of a pipeline run.
///
/// Use [`PipelineConfig::builder`] to construct one, or rely on
/// [`Default`] for the standard setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory where rendered HTML reports are stored.
    pub reports_dir: PathBuf,

    /// Dataset to analyze when the CLI is invoked without a path.
    pub default_dataset: Option<PathBuf>,

    /// Whether the summarizer may call the configured language model.
    /// When `false` the templated fallback summary is always used.
    pub use_language_model: bool,

    /// Whether rendered reports are persisted to `reports_dir`.
    pub save_reports: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("output"),
            default_dataset: None,
            use_language_model: true,
            save_reports: true,
        }
    }
}

impl PipelineConfig {
    /// Create a builder for constructing a configuration.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.reports_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyReportsDir);
        }
        if let Some(dataset) = &self.default_dataset
            && dataset.as_os_str().is_empty()
        {
            return Err(ConfigValidationError::EmptyDefaultDataset);
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    reports_dir: Option<PathBuf>,
    default_dataset: Option<PathBuf>,
    use_language_model: Option<bool>,
    save_reports: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = Some(dir.into());
        self
    }

    pub fn default_dataset(mut self, dataset: impl Into<PathBuf>) -> Self {
        self.default_dataset = Some(dataset.into());
        self
    }

    pub fn use_language_model(mut self, enabled: bool) -> Self {
        self.use_language_model = Some(enabled);
        self
    }

    pub fn save_reports(mut self, enabled: bool) -> Self {
        self.save_reports = Some(enabled);
        self
    }

    /// Build the configuration, validating the provided values.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            reports_dir: self.reports_dir.unwrap_or(defaults.reports_dir),
            default_dataset: self.default_dataset.or(defaults.default_dataset),
            use_language_model: self
                .use_language_model
                .unwrap_or(defaults.use_language_model),
            save_reports: self.save_reports.unwrap_or(defaults.save_reports),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.reports_dir, PathBuf::from("output"));
        assert_eq!(config.default_dataset, None);
        assert!(config.use_language_model);
        assert!(config.save_reports);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .reports_dir("reports")
            .default_dataset("data/train.csv")
            .use_language_model(false)
            .save_reports(false)
            .build()
            .unwrap();

        assert_eq!(config.reports_dir, PathBuf::from("reports"));
        assert_eq!(config.default_dataset, Some(PathBuf::from("data/train.csv")));
        assert!(!config.use_language_model);
        assert!(!config.save_reports);
    }

    #[test]
    fn test_empty_reports_dir_rejected() {
        let result = PipelineConfig::builder().reports_dir("").build();
        assert!(matches!(result, Err(ConfigValidationError::EmptyReportsDir)));
    }

    #[test]
    fn test_empty_default_dataset_rejected() {
        let result = PipelineConfig::builder().default_dataset("").build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::EmptyDefaultDataset)
        ));
    }

    #[test]
    fn test_serde_round_trip() {
        let config = PipelineConfig::builder()
            .reports_dir("out")
            .use_language_model(false)
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{"reports_dir": "archive"}"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.reports_dir, PathBuf::from("archive"));
        assert!(config.use_language_model); // defaults applied
        assert!(config.save_reports);
    }
}
