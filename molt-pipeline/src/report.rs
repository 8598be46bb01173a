//! Structured per-file outcome reporting.
//!
//! Three report files are written after `check` and `convert`:
//!
//! - `molt-results.json` — one `{path, error}` entry per selected file,
//!   sorted by path, `error` null on success;
//! - `molt-successful-files.txt` — the successfully converted paths;
//! - `molt-errors.log` — a `===== <path>` delimiter per failing file,
//!   followed by the raw tool error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use molt_core::{FileTask, TaskStatus};

use crate::error::{io_err, PipelineError};

pub const RESULTS_FILE: &str = "molt-results.json";
pub const SUCCESSFUL_FILES_FILE: &str = "molt-successful-files.txt";
pub const ERRORS_FILE: &str = "molt-errors.log";

/// One line of the JSON results report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// The aggregated outcome of a pipeline run, sorted by original path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub entries: Vec<ReportEntry>,
}

impl ConversionReport {
    /// Build a report from the final task set.
    pub fn from_tasks(tasks: &[FileTask]) -> Self {
        let mut entries: Vec<ReportEntry> = tasks
            .iter()
            .map(|t| ReportEntry {
                path: t.source_path.clone(),
                error: match t.status {
                    TaskStatus::Failed => Some(
                        t.error
                            .clone()
                            .unwrap_or_else(|| "unknown error".to_owned()),
                    ),
                    _ => None,
                },
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries }
    }

    /// Paths that converted successfully.
    pub fn successful_paths(&self) -> Vec<&Path> {
        self.entries
            .iter()
            .filter(|e| e.error.is_none())
            .map(|e| e.path.as_path())
            .collect()
    }

    /// How many files failed.
    pub fn failure_count(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_some()).count()
    }

    /// Write the three report files into `dir`.
    pub fn write_files(&self, dir: &Path) -> Result<(), PipelineError> {
        let results_path = dir.join(RESULTS_FILE);
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&results_path, json).map_err(|e| io_err(&results_path, e))?;

        let successful = self
            .successful_paths()
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let successful_path = dir.join(SUCCESSFUL_FILES_FILE);
        std::fs::write(&successful_path, successful).map_err(|e| io_err(&successful_path, e))?;

        let mut errors = String::new();
        for entry in self.entries.iter().filter(|e| e.error.is_some()) {
            errors.push_str(&format!(
                "===== {}\n{}\n",
                entry.path.display(),
                entry.error.as_deref().unwrap_or_default()
            ));
        }
        let errors_path = dir.join(ERRORS_FILE);
        std::fs::write(&errors_path, errors).map_err(|e| io_err(&errors_path, e))?;

        tracing::info!(
            "wrote report files: {} entries, {} failed",
            self.entries.len(),
            self.failure_count()
        );
        Ok(())
    }
}

/// `"A.coffee"`, `"A.coffee and 1 other file"`, `"A.coffee and 2 other files"`.
///
/// Used by every stage commit message; `paths` must already be sorted.
pub fn file_set_phrase(paths: &[&Path]) -> String {
    let first = paths
        .first()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match paths.len() {
        0 | 1 => first,
        2 => format!("{first} and 1 other file"),
        n => format!("{first} and {} other files", n - 1),
    }
}

/// `"1 file"`, `"3 files"`.
pub fn count_phrase(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
