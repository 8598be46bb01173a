//! Pristine-copy backups for destructive stages.
//!
//! Before the transpiler overwrites a renamed file, its legacy content is
//! copied to a sibling `<stem>.original.<legacy_ext>` file. Backups are never
//! deleted automatically — a failed conversion must always leave the original
//! recoverable — and are removed in bulk by the explicit `clean` operation.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use molt_core::Extension;

use crate::error::{io_err, PipelineError};

/// `lib/A.js` → `lib/A.original.coffee`.
pub fn backup_path(target: &Path, legacy_ext: &Extension) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!("{stem}.original.{legacy_ext}"))
}

/// Copy `target`'s current content to its backup path.
pub fn create(target: &Path, legacy_ext: &Extension) -> Result<PathBuf, PipelineError> {
    let backup = backup_path(target, legacy_ext);
    std::fs::copy(target, &backup).map_err(|e| io_err(target, e))?;
    Ok(backup)
}

/// Overwrite `target` with its backup content. The backup is kept.
pub fn restore(target: &Path, legacy_ext: &Extension) -> Result<(), PipelineError> {
    let backup = backup_path(target, legacy_ext);
    std::fs::copy(&backup, target).map_err(|e| io_err(&backup, e))?;
    Ok(())
}

/// Delete every backup file under `root`. Idempotent; returns what was
/// removed, sorted.
pub fn clean(root: &Path, legacy_ext: &Extension) -> Result<Vec<PathBuf>, PipelineError> {
    let suffix = format!(".original.{legacy_ext}");
    let mut removed = Vec::new();
    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let is_backup = entry
            .file_name()
            .to_str()
            .map(|name| name.ends_with(&suffix))
            .unwrap_or(false);
        if is_backup {
            std::fs::remove_file(entry.path()).map_err(|e| io_err(entry.path(), e))?;
            removed.push(entry.into_path());
        }
    }
    removed.sort();
    Ok(removed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
