//! Error types for molt-git.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from driving the `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The `git` binary could not be spawned at all.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// `git` ran but exited non-zero.
    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The given directory is not inside a git repository.
    #[error("{} is not inside a git repository", path.display())]
    NotARepository { path: PathBuf },

    /// A required git config key is unset.
    #[error("git config key '{key}' is not set")]
    ConfigMissing { key: String },
}
