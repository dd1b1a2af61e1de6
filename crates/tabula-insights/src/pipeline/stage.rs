//! Stage descriptors and per-stage results.
//!
//! The pipeline is a flat table of [`StageSpec`] entries executed in
//! order. A descriptor declares which context keys the stage requires and
//! provides, so the runner can skip a stage whose inputs never arrived
//! instead of letting it fail halfway through.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agents;
use crate::context::{StageContext, keys};
use crate::error::Result;
use crate::llm::LlmProvider;

/// Per-run inputs handed to every stage function.
///
/// The language model is an explicit dependency here rather than a
/// global, so tests can substitute a double and runs stay isolated.
pub struct StageEnv<'a> {
    /// Path of the CSV file to analyze.
    pub input: &'a Path,
    /// Base name of the uploaded file, used for context and reporting.
    pub source_name: &'a str,
    /// Model used by the summarizer; `None` means the templated fallback.
    pub llm: Option<&'a dyn LlmProvider>,
}

/// A stage function: reads and writes the context, returns the stage's
/// key-output line (e.g. "150 rows loaded") on success.
pub type StageFn = fn(&mut StageContext, &StageEnv<'_>) -> Result<String>;

/// Static description of one pipeline stage.
pub struct StageSpec {
    /// Stage name, also the agent name in status endpoints.
    pub name: &'static str,
    /// One-line description shown in reports.
    pub description: &'static str,
    /// Context keys that must exist before the stage runs.
    pub requires: &'static [&'static str],
    /// Context keys the stage writes when it completes.
    pub provides: &'static [&'static str],
    /// Whether a failure of this stage aborts the whole run.
    pub fatal: bool,
    /// The stage implementation.
    pub run: StageFn,
}

/// The fixed stage table, in execution order.
///
/// Only the ingestor is fatal: without a dataset nothing downstream can
/// run. Later stages are isolated, so a failure is recorded and the run
/// continues.
pub const STAGES: [StageSpec; 4] = [
    StageSpec {
        name: "ingestor",
        description: "Load and parse the uploaded CSV file.",
        requires: &[],
        provides: &[
            keys::DATASET,
            keys::FILENAME,
            keys::ROW_COUNT,
            keys::COLUMN_COUNT,
            keys::COLUMN_NAMES,
        ],
        fatal: true,
        run: agents::ingestor::run,
    },
    StageSpec {
        name: "cleaner",
        description: "Clean and validate the dataset.",
        requires: &[keys::DATASET],
        provides: &[keys::NULL_SUMMARY, keys::CLEANING_SUGGESTIONS],
        fatal: false,
        run: agents::cleaner::run,
    },
    StageSpec {
        name: "analyzer",
        description: "Perform basic descriptive statistics.",
        requires: &[keys::DATASET],
        provides: &[keys::COLUMN_STATS],
        fatal: false,
        run: agents::analyzer::run,
    },
    StageSpec {
        name: "summarizer",
        description: "Generate LLM-based summary of insights.",
        requires: &[keys::COLUMN_STATS],
        provides: &[keys::SUMMARY_TEXT],
        fatal: false,
        run: agents::summarizer::run,
    },
];

/// Outcome of one stage within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// The stage ran and produced its outputs.
    Completed,
    /// The stage ran and returned an error.
    Failed,
    /// The stage never ran because a required context key was missing.
    Skipped,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StageStatus::Completed => "completed",
            StageStatus::Failed => "failed",
            StageStatus::Skipped => "skipped",
        };
        write!(f, "{label}")
    }
}

/// Record of one stage execution, kept in run order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: String,
    pub description: String,
    pub status: StageStatus,
    /// Key-output line for completed stages.
    pub output: Option<String>,
    /// Failure or skip explanation.
    pub error_message: Option<String>,
}

impl StageResult {
    pub fn completed(spec: &StageSpec, output: impl Into<String>) -> Self {
        Self {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            status: StageStatus::Completed,
            output: Some(output.into()),
            error_message: None,
        }
    }

    pub fn failed(spec: &StageSpec, error: impl Into<String>) -> Self {
        Self {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            status: StageStatus::Failed,
            output: None,
            error_message: Some(error.into()),
        }
    }

    pub fn skipped(spec: &StageSpec, reason: impl Into<String>) -> Self {
        Self {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            status: StageStatus::Skipped,
            output: None,
            error_message: Some(reason.into()),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }
}
