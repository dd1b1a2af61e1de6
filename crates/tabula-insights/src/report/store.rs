//! Flat-file persistence for rendered reports.
//!
//! Reports are stored as `{report_id}.html` directly under the store
//! root. Report ids double as file names, so every id that crosses the
//! store boundary is validated against path traversal before it is
//! joined onto the root.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Length of the random suffix appended on a report-id collision.
const COLLISION_SUFFIX_LEN: usize = 6;

/// A stored report as returned by [`ReportStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub report_id: String,
    pub filename: String,
    /// Modification time, formatted `%Y-%m-%d %H:%M:%S`.
    pub created_at: String,
    pub size_bytes: u64,
}

/// Flat-file report store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ReportStore {
    root: PathBuf,
}

impl ReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocate a fresh report id for `source_filename`.
    ///
    /// The id is the sanitized file stem plus a second-resolution
    /// timestamp. Two runs of the same file within one second would
    /// collide, so an existing id gets a random alphanumeric suffix.
    pub fn allocate_id(&self, source_filename: &str, generated_at: DateTime<Local>) -> String {
        let stem = Path::new(source_filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        let stem = sanitize_component(stem);
        let base = format!("{}_{}", stem, generated_at.format("%Y%m%d_%H%M%S"));

        if !self.exists(&base) {
            return base;
        }

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(COLLISION_SUFFIX_LEN)
            .map(char::from)
            .collect();
        debug!("Report id '{}' already exists, adding suffix", base);
        format!("{base}_{suffix}")
    }

    /// Whether a report with this id exists. Invalid ids never exist.
    pub fn exists(&self, report_id: &str) -> bool {
        match self.path_for(report_id) {
            Ok(path) => path.is_file(),
            Err(_) => false,
        }
    }

    /// Persist a rendered report, creating the root directory on demand.
    pub fn save(&self, report_id: &str, body: &str) -> Result<PathBuf> {
        let path = self.path_for(report_id)?;
        fs::create_dir_all(&self.root).map_err(|e| {
            PipelineError::Storage(format!(
                "could not create reports directory '{}': {e}",
                self.root.display()
            ))
        })?;
        fs::write(&path, body).map_err(|e| {
            PipelineError::Storage(format!("could not write report '{report_id}': {e}"))
        })?;
        debug!("Saved report to {}", path.display());
        Ok(path)
    }

    /// Read a stored report body.
    pub fn get(&self, report_id: &str) -> Result<String> {
        let path = self.path_for(report_id)?;
        if !path.is_file() {
            return Err(PipelineError::ReportNotFound(report_id.to_string()));
        }
        fs::read_to_string(&path).map_err(|e| {
            PipelineError::Storage(format!("could not read report '{report_id}': {e}"))
        })
    }

    /// Delete a stored report.
    pub fn delete(&self, report_id: &str) -> Result<()> {
        let path = self.path_for(report_id)?;
        if !path.is_file() {
            return Err(PipelineError::ReportNotFound(report_id.to_string()));
        }
        fs::remove_file(&path).map_err(|e| {
            PipelineError::Storage(format!("could not delete report '{report_id}': {e}"))
        })
    }

    /// List stored reports, newest first.
    ///
    /// A store whose root directory does not exist yet lists as empty.
    pub fn list(&self) -> Result<Vec<StoredReport>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.root).map_err(|e| {
            PipelineError::Storage(format!(
                "could not list reports directory '{}': {e}",
                self.root.display()
            ))
        })?;

        let mut reports: Vec<(SystemTime, StoredReport)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::Storage(e.to_string()))?;
            let path = entry.path();
            let Some(report_id) = report_id_of(&path) else {
                continue;
            };
            let metadata = entry
                .metadata()
                .map_err(|e| PipelineError::Storage(e.to_string()))?;
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            let created_at: DateTime<Local> = modified.into();

            reports.push((
                modified,
                StoredReport {
                    report_id,
                    filename: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    created_at: created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    size_bytes: metadata.len(),
                },
            ));
        }

        reports.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(reports.into_iter().map(|(_, r)| r).collect())
    }

    /// Resolve a validated report id to its path under the root.
    fn path_for(&self, report_id: &str) -> Result<PathBuf> {
        if !is_valid_report_id(report_id) {
            return Err(PipelineError::InvalidReportId(report_id.to_string()));
        }
        Ok(self.root.join(format!("{report_id}.html")))
    }
}

/// Ids are restricted to a filename-safe alphabet; anything with path
/// separators, parent-directory dots, or an empty body is rejected.
fn is_valid_report_id(report_id: &str) -> bool {
    !report_id.is_empty()
        && !report_id.contains("..")
        && report_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Map a source-file stem onto the id alphabet.
fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "dataset".to_string()
    } else {
        cleaned.replace("..", "_")
    }
}

fn report_id_of(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("html") {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store() -> (TempDir, ReportStore) {
        let dir = TempDir::new().unwrap();
        let store = ReportStore::new(dir.path().join("reports"));
        (dir, store)
    }

    fn now() -> DateTime<Local> {
        use chrono::TimeZone;
        Local.with_ymd_and_hms(2024, 3, 1, 14, 30, 5).unwrap()
    }

    #[test]
    fn test_save_get_round_trip() {
        let (_dir, store) = store();
        let body = "<html><body>report</body></html>";

        let path = store.save("orders_20240301_143005", body).unwrap();
        assert!(path.is_file());
        assert_eq!(store.get("orders_20240301_143005").unwrap(), body);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let (_dir, store) = store();
        let err = store.get("missing_20240301_143005").unwrap_err();
        assert_eq!(err.error_code(), "REPORT_NOT_FOUND");
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let (_dir, store) = store();
        store.save("orders_20240301_143005", "body").unwrap();

        store.delete("orders_20240301_143005").unwrap();
        let err = store.get("orders_20240301_143005").unwrap_err();
        assert_eq!(err.error_code(), "REPORT_NOT_FOUND");
        assert!(store.delete("orders_20240301_143005").is_err());
    }

    #[test]
    fn test_list_excludes_deleted_and_foreign_files() {
        let (_dir, store) = store();
        store.save("first_20240301_143005", "a").unwrap();
        store.save("second_20240301_143006", "bb").unwrap();
        std::fs::write(store.root().join("notes.txt"), "ignore me").unwrap();

        store.delete("first_20240301_143005").unwrap();
        let reports = store.list().unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].report_id, "second_20240301_143006");
        assert_eq!(reports[0].filename, "second_20240301_143006.html");
        assert_eq!(reports[0].size_bytes, 2);
    }

    #[test]
    fn test_list_missing_root_is_empty() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_traversal_ids_are_rejected() {
        let (_dir, store) = store();
        for bad in ["../etc/passwd", "a/b", "a\\b", "", "..", "x/../y"] {
            let err = store.get(bad).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_REPORT_ID", "id: {bad:?}");
            assert!(!store.exists(bad));
        }
    }

    #[test]
    fn test_allocate_id_shape() {
        let (_dir, store) = store();
        let id = store.allocate_id("orders.csv", now());
        assert_eq!(id, "orders_20240301_143005");

        // Multi-dot names keep everything before the extension.
        let id = store.allocate_id("my.data.csv", now());
        assert_eq!(id, "my.data_20240301_143005");
    }

    #[test]
    fn test_allocate_id_sanitizes_hostile_names() {
        let (_dir, store) = store();
        let id = store.allocate_id("../../etc/passwd weird$.csv", now());
        assert!(is_valid_report_id(&id), "id: {id:?}");
        assert!(!id.contains('/'));
        assert!(!id.contains(".."));
    }

    #[test]
    fn test_allocate_id_collision_gets_suffix() {
        let (_dir, store) = store();
        let first = store.allocate_id("orders.csv", now());
        store.save(&first, "body").unwrap();

        let second = store.allocate_id("orders.csv", now());
        assert_ne!(first, second);
        assert!(second.starts_with(&first));
        assert_eq!(second.len(), first.len() + 1 + COLLISION_SUFFIX_LEN);
    }
}
