//! Error types for molt-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from file selection and config loading.
///
/// Every variant here is a repository-wide precondition failure: the pipeline
/// must abort before any mutation when one is raised.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line in the path file did not end in the legacy extension.
    #[error("The line \"{line}\" must be a file path ending in {extension}.")]
    PathFileBadLine { line: String, extension: String },

    /// A line in the path file named a file that does not exist.
    #[error("The file \"{}\" did not exist.", path.display())]
    PathFileMissingFile { path: PathBuf },

    /// The config file exists but could not be parsed.
    #[error("failed to parse config at {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A codemod script string named neither a builtin nor an existing file.
    #[error("unknown codemod script \"{name}\"; not a builtin and no such file exists")]
    UnknownCodemodScript { name: String },

    /// No legacy files were found by any selection method.
    #[error("no files found with the {extension} extension under {}", dir.display())]
    NoFilesFound { extension: String, dir: PathBuf },
}
