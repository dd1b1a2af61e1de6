//! CSV Insight Pipeline Library
//!
//! A staged, model-optional CSV analysis library built on Polars.
//!
//! # Overview
//!
//! This library turns a raw CSV file into a shareable insight report by
//! running a fixed sequence of stages over a shared context:
//!
//! - **Ingestion**: CSV parsing with schema inference and malformed-file fallbacks
//! - **Cleaning**: Per-column missing-value counts and cleaning suggestions
//! - **Analysis**: Count, mean, sum, min, and max for every numeric column
//! - **Summarization**: A model-written narrative with a statistics fallback
//! - **Reporting**: A self-contained HTML document plus a JSON view of the results
//!
//! Only ingestion can abort a run. Every later stage is isolated: its
//! failure is recorded in the report and the remaining stages still run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula_insights::{GeminiProvider, Pipeline, PipelineConfig};
//!
//! // Option 1: With model-written summaries
//! let provider = Arc::new(GeminiProvider::new(api_key)?);
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::builder().reports_dir("output").build()?)
//!     .llm_provider(provider)
//!     .build()?;
//!
//! // Option 2: Statistics-only summaries (no API key required)
//! let pipeline = Pipeline::builder().build()?;
//!
//! let analysis = pipeline.process("data/orders.csv".as_ref(), "orders.csv")?;
//! println!("Report saved: {:?}", analysis.saved_path);
//! println!("{}", analysis.report.summary_text.unwrap_or_default());
//! ```
//!
//! # Model Providers
//!
//! Summaries are produced through the [`llm::LlmProvider`] trait. The
//! built-in provider is Gemini (enabled by the `ai` feature, on by
//! default). Implement the trait to plug in another model; the
//! summarizer falls back to raw statistics whenever the provider fails
//! or is absent.
//!
//! # Serving
//!
//! The [`server`] module exposes the same pipeline over HTTP: upload a
//! CSV to `POST /analyze` and browse stored reports under `/reports`.

pub mod agents;
pub mod config;
pub mod context;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod server;

// Re-exports for convenient access
pub use agents::{AgentInfo, AgentRegistry};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use context::{ColumnStats, ContextValue, StageContext};
pub use error::{PipelineError, Result, ResultExt};
pub use llm::LlmProvider;
#[cfg(feature = "ai")]
pub use llm::{GeminiConfig, GeminiConfigBuilder, GeminiProvider};
pub use pipeline::{
    Analysis, Pipeline, PipelineBuilder, PipelineOutcome, PipelineRunner, STAGES, StageEnv,
    StageFn, StageResult, StageSpec, StageStatus,
};
pub use report::{DatasetOverview, Report, ReportStore, StoredReport};
