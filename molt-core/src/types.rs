//! Domain types for the molt conversion pipeline.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem
//! paths. A [`FileTask`] is created once per selected legacy file and carried
//! through every pipeline stage.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Extensions
// ---------------------------------------------------------------------------

/// A file extension without the leading dot (e.g. `"coffee"`, `"js"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extension(pub String);

impl Extension {
    /// The extension with a leading dot, as shown in commit messages.
    pub fn dotted(&self) -> String {
        format!(".{}", self.0)
    }

    /// Whether `path` ends in this extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| *e == *self.0.as_str())
            .unwrap_or(false)
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Extension {
    fn from(s: &str) -> Self {
        Self(s.trim_start_matches('.').to_owned())
    }
}

impl From<String> for Extension {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

// ---------------------------------------------------------------------------
// File tasks
// ---------------------------------------------------------------------------

/// Where a file currently stands in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Selected but not yet touched by any stage.
    #[default]
    Pending,
    /// Every stage so far has succeeded.
    Converted,
    /// A stage failed for this file; it is excluded from later stages.
    Failed,
    /// Deliberately not processed (dry run classification only).
    Skipped,
}

/// One selected file, tracked across all pipeline stages.
///
/// Mutated by each stage; immutable once the pipeline ends. A task that fails
/// a stage keeps the error detail from the first failing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTask {
    /// The legacy file as originally selected.
    pub source_path: PathBuf,
    /// `source_path` with the legacy extension swapped for the target one.
    pub target_path: PathBuf,
    pub status: TaskStatus,
    /// Raw error output from the first failing stage, if any.
    pub error: Option<String>,
}

impl FileTask {
    /// Build a task for `source`, deriving the target path by extension swap.
    pub fn new(source: PathBuf, target_ext: &Extension) -> Self {
        let target_path = source.with_extension(&target_ext.0);
        Self {
            source_path: source,
            target_path,
            status: TaskStatus::Pending,
            error: None,
        }
    }

    /// Whether this task still participates in upcoming stages.
    pub fn is_active(&self) -> bool {
        matches!(self.status, TaskStatus::Pending | TaskStatus::Converted)
    }

    /// Record a stage failure. The first error wins.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = TaskStatus::Failed;
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }
}

/// Sort tasks by source path so reports and commit messages are
/// deterministic regardless of worker-pool completion order.
pub fn sort_tasks(tasks: &mut [FileTask]) {
    tasks.sort_by(|a, b| a.source_path.cmp(&b.source_path));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
