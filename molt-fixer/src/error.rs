//! Error types for molt-fixer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the whole fixer run.
///
/// Per-file parse failures are deliberately *not* here — they only skip the
/// affected file and are reported in the [`crate::FixOutcome`].
#[derive(Debug, Error)]
pub enum FixError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`FixError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FixError {
    FixError::Io {
        path: path.into(),
        source,
    }
}
