//! The `molt.config.json` config model.
//!
//! Every field is optional in the file; [`Config::default`] gives the
//! CoffeeScript-to-JavaScript defaults. The config only *describes* the run —
//! resolution of file lists and codemod scripts happens elsewhere
//! ([`crate::selector`] and the pipeline's stage construction).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Extension;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "molt.config.json";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Per-repository configuration for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Explicit list of legacy files to convert.
    pub files: Vec<PathBuf>,
    /// File containing one legacy path per line (`#` comments allowed).
    pub path_file: Option<PathBuf>,
    /// Directory to search for legacy files when nothing else is given.
    pub search_dir: Option<PathBuf>,
    /// Extension being migrated away from.
    pub legacy_ext: Extension,
    /// Extension being migrated to.
    pub target_ext: Extension,
    /// Transpiler executable; receives the input path as its last argument
    /// and writes converted source to stdout.
    pub transpiler_cmd: String,
    /// Extra arguments passed to the transpiler before the input path.
    pub transpiler_args: Vec<String>,
    /// Codemod runner executable (`jscodeshift`-compatible: `-t <script>`).
    pub codemod_cmd: String,
    /// Codemod scripts to run in the post-process stage, in order. Each entry
    /// is either a builtin name or a path to a script file.
    pub codemod_scripts: Vec<String>,
    /// Linter executable, run with `--fix --format json`.
    pub lint_cmd: String,
    /// Pattern matched against converted target paths; matching files get
    /// an `eslint-env mocha` line in their marker header.
    pub mocha_env_file_pattern: Option<String>,
    /// Skip the lint-fix stage even if a lint config exists.
    pub skip_lint_fix: bool,
    /// Skip the whole-repository import fixing stage.
    pub skip_fix_imports: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            files: vec![],
            path_file: None,
            search_dir: None,
            legacy_ext: Extension::from("coffee"),
            target_ext: Extension::from("js"),
            transpiler_cmd: "decaffeinate".to_owned(),
            transpiler_args: vec![],
            codemod_cmd: "jscodeshift".to_owned(),
            codemod_scripts: vec![],
            lint_cmd: "eslint".to_owned(),
            mocha_env_file_pattern: None,
            skip_lint_fix: false,
            skip_fix_imports: false,
        }
    }
}

impl Config {
    /// Load `molt.config.json` from `dir`, or defaults when it is absent.
    pub fn load_from(dir: &Path) -> Result<Self, CoreError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|source| CoreError::ConfigParse { path, source })
    }
}

// ---------------------------------------------------------------------------
// Codemod scripts
// ---------------------------------------------------------------------------

/// A codemod script reference, resolved once at stage construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodemodScript {
    /// A script shipped inside molt, identified by name.
    Builtin { name: String },
    /// A user-supplied script file.
    Custom { path: PathBuf },
}

impl CodemodScript {
    /// Resolve a raw config entry against the set of builtin script names.
    ///
    /// A raw entry naming a builtin wins over a same-named file on disk;
    /// anything else must be an existing file path.
    pub fn resolve(raw: &str, builtin_names: &[&str]) -> Result<Self, CoreError> {
        if builtin_names.contains(&raw) {
            return Ok(Self::Builtin {
                name: raw.to_owned(),
            });
        }
        let path = PathBuf::from(raw);
        if path.exists() {
            return Ok(Self::Custom { path });
        }
        Err(CoreError::UnknownCodemodScript {
            name: raw.to_owned(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
