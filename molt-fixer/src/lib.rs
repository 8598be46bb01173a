//! # molt-fixer
//!
//! Cross-file import/export reference fixer.
//!
//! Converting a module can change its public shape — most commonly a legacy
//! module that compiled to a single default export becomes a set of named
//! exports. [`fix_imports`] scans the *whole* repository (converted or not),
//! infers an export shape for every converted module, and rewrites each
//! importer to the minimal correct form.

pub mod error;
pub mod exports;
pub mod imports;
pub mod rewrite;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use molt_core::Extension;

use crate::error::io_err;
use crate::exports::{infer_export_shape, ExportShape};
use crate::rewrite::rewrite_source;

pub use error::FixError;

/// Directories never scanned for importers.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules"];

/// What one fixer run did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixOutcome {
    /// Files whose imports were rewritten, sorted.
    pub touched: Vec<PathBuf>,
    /// Files skipped because their imports could not be parsed.
    pub skipped: Vec<PathBuf>,
}

/// Fix import statements across the repository at `root`.
///
/// `converted` lists the target paths of every successfully converted module.
/// Every `*.<target_ext>` file under `root` is scanned; files that cannot be
/// read or parsed are skipped with a warning and listed in the outcome.
pub fn fix_imports(
    root: &Path,
    converted: &[PathBuf],
    target_ext: &Extension,
) -> Result<FixOutcome, FixError> {
    let shapes = build_shapes(converted)?;
    let mut outcome = FixOutcome::default();
    if shapes.is_empty() {
        return Ok(outcome);
    }

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| {
            e.file_name()
                .to_str()
                .map(|name| !SKIPPED_DIRS.contains(&name))
                .unwrap_or(true)
        })
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if !target_ext.matches(path) {
            continue;
        }
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                outcome.skipped.push(path.to_path_buf());
                continue;
            }
        };
        match rewrite_source(path, &source, &shapes, target_ext) {
            Ok(Some(fixed)) => {
                fs::write(path, fixed).map_err(|e| io_err(path, e))?;
                outcome.touched.push(path.to_path_buf());
            }
            Ok(None) => {}
            Err(failure) => {
                log::warn!(
                    "skipping {}: cannot parse import line \"{}\"",
                    path.display(),
                    failure.line
                );
                outcome.skipped.push(path.to_path_buf());
            }
        }
    }

    outcome.touched.sort();
    outcome.skipped.sort();
    Ok(outcome)
}

/// Infer an [`ExportShape`] for every converted module, keyed by canonical path.
fn build_shapes(converted: &[PathBuf]) -> Result<HashMap<PathBuf, ExportShape>, FixError> {
    let mut shapes = HashMap::new();
    for path in converted {
        let canonical = path.canonicalize().map_err(|e| io_err(path, e))?;
        let source = fs::read_to_string(&canonical).map_err(|e| io_err(&canonical, e))?;
        shapes.insert(canonical, infer_export_shape(&source));
    }
    Ok(shapes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn rewrites_importers_across_the_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::write(
            dir.path().join("util.js"),
            "export function run() {}\nexport function stop() {}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("app/main.js"),
            "import util from '../util';\nutil.run();\nmodule.hot && util;\n",
        )
        .unwrap();
        // A pre-existing file that already imports correctly.
        fs::write(
            dir.path().join("app/other.js"),
            "import { run } from '../util';\nrun();\n",
        )
        .unwrap();

        let outcome = fix_imports(
            dir.path(),
            &[dir.path().join("util.js")],
            &Extension::from("js"),
        )
        .unwrap();

        assert_eq!(outcome.touched, vec![dir.path().join("app/main.js")]);
        assert!(outcome.skipped.is_empty());
        let fixed = fs::read_to_string(dir.path().join("app/main.js")).unwrap();
        assert!(fixed.starts_with("import * as util from '../util';"));
    }

    #[test]
    fn unparseable_file_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("util.js"), "export const a = 1;\n").unwrap();
        fs::write(dir.path().join("bad.js"), "import !!! nonsense\n").unwrap();
        fs::write(
            dir.path().join("good.js"),
            "import u from './util';\nu;\n",
        )
        .unwrap();

        let outcome = fix_imports(
            dir.path(),
            &[dir.path().join("util.js")],
            &Extension::from("js"),
        )
        .unwrap();

        assert_eq!(outcome.skipped, vec![dir.path().join("bad.js")]);
        assert_eq!(outcome.touched, vec![dir.path().join("good.js")]);
    }

    #[test]
    fn node_modules_are_never_scanned() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("util.js"), "export const a = 1;\n").unwrap();
        // Would be rewritten if it were scanned.
        fs::write(
            dir.path().join("node_modules/dep.js"),
            "import u from '../util';\nu;\n",
        )
        .unwrap();

        let outcome = fix_imports(
            dir.path(),
            &[dir.path().join("util.js")],
            &Extension::from("js"),
        )
        .unwrap();
        assert!(outcome.touched.is_empty());
    }

    #[test]
    fn second_run_over_a_fixed_tree_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("util.js"),
            "export function run() {}\nexport function stop() {}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("main.js"),
            "import util from './util';\nutil.run();\nutil.stop();\n",
        )
        .unwrap();
        let converted = vec![dir.path().join("util.js")];
        let ext = Extension::from("js");

        let first = fix_imports(dir.path(), &converted, &ext).unwrap();
        assert_eq!(first.touched, vec![dir.path().join("main.js")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("main.js")).unwrap(),
            "import { run, stop } from './util';\nrun();\nstop();\n"
        );

        let second = fix_imports(dir.path(), &converted, &ext).unwrap();
        assert!(second.touched.is_empty(), "fixed tree must be stable");
    }

    #[test]
    fn no_converted_modules_means_nothing_to_do() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "import x from './b';\n").unwrap();
        let outcome = fix_imports(dir.path(), &[], &Extension::from("js")).unwrap();
        assert_eq!(outcome, FixOutcome::default());
    }
}
