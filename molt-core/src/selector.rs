//! File selection for a conversion run.
//!
//! Resolution precedence (first non-empty source wins):
//!
//! 1. explicit `--file` flags
//! 2. `--path-file`
//! 3. `files` from the config
//! 4. `pathFile` from the config
//! 5. recursive discovery of `*.<legacy_ext>` under the search directory
//!
//! Path files are validated strictly: every non-comment line must end in the
//! legacy extension and must exist on disk, otherwise selection fails with
//! zero side effects.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::CoreError;
use crate::types::Extension;

/// Directories never searched for legacy files.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];

// ---------------------------------------------------------------------------
// Selection inputs
// ---------------------------------------------------------------------------

/// File selection flags as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Individual files from repeated `--file` flags.
    pub files: Vec<PathBuf>,
    /// A path-list file from `--path-file`.
    pub path_file: Option<PathBuf>,
    /// Search directory from `--dir`.
    pub search_dir: Option<PathBuf>,
}

/// Resolve the set of legacy files to convert, in sorted order.
pub fn resolve(selection: &Selection, config: &Config, cwd: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let ext = &config.legacy_ext;

    if !selection.files.is_empty() {
        let mut files = selection.files.clone();
        files.sort();
        return Ok(files);
    }
    if let Some(path_file) = &selection.path_file {
        return from_path_file(path_file, ext);
    }
    if !config.files.is_empty() {
        let mut files = config.files.clone();
        files.sort();
        return Ok(files);
    }
    if let Some(path_file) = &config.path_file {
        return from_path_file(path_file, ext);
    }

    let dir = selection
        .search_dir
        .clone()
        .or_else(|| config.search_dir.clone())
        .unwrap_or_else(|| cwd.to_path_buf());
    discover(&dir, ext)
}

// ---------------------------------------------------------------------------
// Path files
// ---------------------------------------------------------------------------

/// Read legacy file paths from a path-list file.
///
/// Blank lines and `#` comments are ignored; every other line must be a path
/// ending in the legacy extension and must exist on disk.
pub fn from_path_file(path: &Path, legacy_ext: &Extension) -> Result<Vec<PathBuf>, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let mut files = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let file = PathBuf::from(line);
        if !legacy_ext.matches(&file) {
            return Err(CoreError::PathFileBadLine {
                line: line.to_owned(),
                extension: legacy_ext.dotted(),
            });
        }
        if !file.exists() {
            return Err(CoreError::PathFileMissingFile { path: file });
        }
        files.push(file);
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Directory discovery
// ---------------------------------------------------------------------------

/// Recursively find all `*.<legacy_ext>` files under `dir`, sorted.
pub fn discover(dir: &Path, legacy_ext: &Extension) -> Result<Vec<PathBuf>, CoreError> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| {
            e.file_name()
                .to_str()
                .map(|name| !SKIPPED_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| legacy_ext.matches(p))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(CoreError::NoFilesFound {
            extension: legacy_ext.dotted(),
            dir: dir.to_path_buf(),
        });
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn coffee() -> Extension {
        Extension::from("coffee")
    }

    #[test]
    fn path_file_reads_paths_and_skips_comments() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.coffee");
        let b = dir.path().join("b.coffee");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();
        let list = dir.path().join("files.txt");
        fs::write(
            &list,
            format!("# comment\n{}\n\n  {}  \n", a.display(), b.display()),
        )
        .unwrap();

        let files = from_path_file(&list, &coffee()).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[rstest]
    #[case("a.js")]
    #[case("plain-line")]
    fn path_file_rejects_wrong_extension(#[case] line: &str) {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("files.txt");
        fs::write(&list, line).unwrap();

        let err = from_path_file(&list, &coffee()).unwrap_err();
        assert!(matches!(err, CoreError::PathFileBadLine { .. }));
        assert!(err.to_string().contains(".coffee"));
    }

    #[test]
    fn path_file_rejects_missing_files() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("files.txt");
        fs::write(&list, "does/not/exist.coffee").unwrap();

        let err = from_path_file(&list, &coffee()).unwrap_err();
        assert!(matches!(err, CoreError::PathFileMissingFile { .. }));
    }

    #[test]
    fn discover_finds_nested_files_and_skips_node_modules() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("top.coffee"), "").unwrap();
        fs::write(dir.path().join("src/deep/inner.coffee"), "").unwrap();
        fs::write(dir.path().join("src/other.js"), "").unwrap();
        fs::write(dir.path().join("node_modules/pkg/dep.coffee"), "").unwrap();

        let files = discover(dir.path(), &coffee()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("src/deep/inner.coffee"),
                PathBuf::from("top.coffee"),
            ]
        );
    }

    #[test]
    fn discover_with_no_matches_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("only.js"), "").unwrap();
        let err = discover(dir.path(), &coffee()).unwrap_err();
        assert!(matches!(err, CoreError::NoFilesFound { .. }));
    }

    #[test]
    fn explicit_files_win_over_everything() {
        let dir = TempDir::new().unwrap();
        let selection = Selection {
            files: vec![PathBuf::from("z.coffee"), PathBuf::from("a.coffee")],
            path_file: Some(PathBuf::from("ignored.txt")),
            search_dir: None,
        };
        let files = resolve(&selection, &Config::default(), dir.path()).unwrap();
        assert_eq!(files, vec![PathBuf::from("a.coffee"), PathBuf::from("z.coffee")]);
    }

    #[test]
    fn config_files_used_when_no_cli_selection() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            files: vec![PathBuf::from("from-config.coffee")],
            ..Config::default()
        };
        let files = resolve(&Selection::default(), &config, dir.path()).unwrap();
        assert_eq!(files, vec![PathBuf::from("from-config.coffee")]);
    }
}
