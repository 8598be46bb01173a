//! Error types for molt-pipeline.

use std::path::PathBuf;

use thiserror::Error;

use molt_core::CoreError;
use molt_fixer::FixError;
use molt_git::GitError;

/// All errors that can abort a pipeline run.
///
/// Per-file stage failures never appear here — they are recorded on the
/// affected [`molt_core::FileTask`] and reported, not raised. Every variant
/// below is either a repository-wide precondition or an environment failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The working tree had uncommitted changes to tracked files.
    #[error(
        "You have modifications to your git worktree. \
         Please revert or commit them before converting."
    )]
    DirtyWorktree { changed: Vec<String> },

    /// A rename target already exists; converting would clobber it.
    #[error("The file {} already exists.", target.display())]
    RenameCollision { target: PathBuf },

    /// An error from selection or config.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from version control.
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// An error from the import fixer.
    #[error("import fixer error: {0}")]
    Fix(#[from] FixError),

    /// The `mochaEnvFilePattern` config value is not a valid pattern.
    #[error("invalid mochaEnvFilePattern \"{pattern}\": {source}")]
    MochaPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (report files).
    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`PipelineError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.into(),
        source,
    }
}
