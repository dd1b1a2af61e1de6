//! Shared state passed through the pipeline stages.
//!
//! Stages communicate exclusively through a [`StageContext`]: each stage
//! reads the keys it requires and writes the keys it provides. Values are
//! carried as [`ContextValue`] variants so a stage can never misread a
//! DataFrame as a string; the typed accessors return `None` on a missing
//! key or a wrong variant instead of panicking.

use std::collections::{BTreeMap, HashMap};

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Well-known context keys, written by one stage and read by later ones.
pub mod keys {
    /// The parsed dataset (written by the ingestor).
    pub const DATASET: &str = "dataset";
    /// Base name of the uploaded file.
    pub const FILENAME: &str = "filename";
    /// Number of rows in the dataset.
    pub const ROW_COUNT: &str = "num_rows";
    /// Number of columns in the dataset.
    pub const COLUMN_COUNT: &str = "num_columns";
    /// Column names in frame order.
    pub const COLUMN_NAMES: &str = "column_names";
    /// Per-column null counts (written by the cleaner).
    pub const NULL_SUMMARY: &str = "null_summary";
    /// Cleaning suggestions for columns with missing values.
    pub const CLEANING_SUGGESTIONS: &str = "cleaning_suggestions";
    /// Per-column descriptive statistics (written by the analyzer).
    pub const COLUMN_STATS: &str = "column_stats";
    /// Natural-language summary (written by the summarizer).
    pub const SUMMARY_TEXT: &str = "final_summary";
}

/// Descriptive statistics for a single numeric column.
///
/// `count` is the number of non-null values. The aggregate fields are
/// `None` (JSON `null`) when the column has no non-null values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: u64,
    pub mean: Option<f64>,
    pub sum: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// A value stored in the stage context.
#[derive(Debug, Clone)]
pub enum ContextValue {
    /// A parsed dataset.
    Frame(DataFrame),
    /// Free-form text, e.g. the summary or the source filename.
    Text(String),
    /// A scalar count, e.g. row or column totals.
    Count(usize),
    /// An ordered list of strings, e.g. column names or suggestions.
    List(Vec<String>),
    /// A string-to-count map, e.g. nulls per column.
    Counts(BTreeMap<String, usize>),
    /// Per-column statistics.
    Stats(BTreeMap<String, ColumnStats>),
}

/// Mutable key/value state shared by the stages of one pipeline run.
///
/// Each run owns a fresh context; contexts are never reused or shared
/// across runs.
#[derive(Debug, Default)]
pub struct StageContext {
    values: HashMap<&'static str, ContextValue>,
}

impl StageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous value under the same key.
    pub fn set(&mut self, key: &'static str, value: ContextValue) {
        self.values.insert(key, value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The dataset under `key`, or `None` if absent or a different variant.
    pub fn frame(&self, key: &str) -> Option<&DataFrame> {
        match self.values.get(key) {
            Some(ContextValue::Frame(df)) => Some(df),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ContextValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn count(&self, key: &str) -> Option<usize> {
        match self.values.get(key) {
            Some(ContextValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.values.get(key) {
            Some(ContextValue::List(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn counts(&self, key: &str) -> Option<&BTreeMap<String, usize>> {
        match self.values.get(key) {
            Some(ContextValue::Counts(map)) => Some(map),
            _ => None,
        }
    }

    pub fn stats(&self, key: &str) -> Option<&BTreeMap<String, ColumnStats>> {
        match self.values.get(key) {
            Some(ContextValue::Stats(map)) => Some(map),
            _ => None,
        }
    }
}
