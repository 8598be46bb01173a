//! Subprocess boundaries: transpiler, codemod runner, linter.
//!
//! These tools are external collaborators. Each runner captures output and
//! turns a non-zero exit into a per-file error string, verbatim, so the
//! report can show exactly what the tool said.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use molt_core::{CodemodScript, Config};

use crate::error::{io_err, PipelineError};

/// Builtin codemod scripts shipped inside the binary.
const BUILTIN_CODEMODS: &[(&str, &str)] = &[
    (
        "prefer-function-declarations",
        include_str!("../assets/prefer-function-declarations.js"),
    ),
    (
        "top-level-this-to-exports",
        include_str!("../assets/top-level-this-to-exports.js"),
    ),
];

/// Names accepted as builtin entries in `codemodScripts`.
pub const BUILTIN_CODEMOD_NAMES: &[&str] =
    &["prefer-function-declarations", "top-level-this-to-exports"];

/// Lint config files searched for, in order, from the repo root upward.
const LINT_CONFIG_FILES: &[&str] = &[
    ".eslintrc",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.json",
    ".eslintrc.yml",
    ".eslintrc.yaml",
    "eslint.config.js",
    "eslint.config.mjs",
];

// ---------------------------------------------------------------------------
// Transpiler
// ---------------------------------------------------------------------------

/// Run the transpiler on `input`, returning the converted source.
///
/// The error string is the tool's stderr (or stdout when stderr is empty),
/// captured verbatim.
pub fn run_transpiler(config: &Config, input: &Path) -> Result<String, String> {
    let output = Command::new(&config.transpiler_cmd)
        .args(&config.transpiler_args)
        .arg(input)
        .output()
        .map_err(|e| format!("failed to run {}: {e}", config.transpiler_cmd))?;
    if !output.status.success() {
        return Err(capture_error(&output.stderr, &output.stdout));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// ---------------------------------------------------------------------------
// Codemod runner
// ---------------------------------------------------------------------------

/// Run one codemod script over one file.
pub fn run_codemod(config: &Config, script: &CodemodScript, file: &Path) -> Result<(), String> {
    let script_path = match script {
        CodemodScript::Custom { path } => path.clone(),
        CodemodScript::Builtin { name } => {
            materialize_builtin(name).map_err(|e| e.to_string())?
        }
    };
    let output = Command::new(&config.codemod_cmd)
        .arg("-t")
        .arg(&script_path)
        .arg(file)
        .output()
        .map_err(|e| format!("failed to run {}: {e}", config.codemod_cmd))?;
    if !output.status.success() {
        return Err(capture_error(&output.stderr, &output.stdout));
    }
    Ok(())
}

/// Write a builtin codemod to a stable temp path so the runner can load it.
fn materialize_builtin(name: &str) -> Result<PathBuf, PipelineError> {
    let source = BUILTIN_CODEMODS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, s)| *s)
        .unwrap_or_default();
    let dir = std::env::temp_dir().join(format!("molt-codemods-{}", std::process::id()));
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    let path = dir.join(format!("{name}.js"));
    std::fs::write(&path, source).map_err(|e| io_err(&path, e))?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Linter
// ---------------------------------------------------------------------------

/// Find a lint config file at `start` or any ancestor directory.
pub fn find_lint_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        LINT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

#[derive(Debug, Deserialize)]
struct LintFileReport {
    #[serde(default)]
    messages: Vec<LintMessage>,
}

#[derive(Debug, Deserialize)]
struct LintMessage {
    #[serde(rename = "ruleId")]
    rule_id: Option<String>,
}

/// Run the linter with autofix on one file.
///
/// Returns the sorted, de-duplicated rule ids still violated after fixing.
/// Exit status 1 means "violations remain" and is not an error; anything
/// above that is a real failure.
pub fn run_lint_fix(config: &Config, file: &Path) -> Result<Vec<String>, String> {
    let output = Command::new(&config.lint_cmd)
        .args(["--fix", "--format", "json"])
        .arg(file)
        .output()
        .map_err(|e| format!("failed to run {}: {e}", config.lint_cmd))?;
    let code = output.status.code().unwrap_or(-1);
    if code > 1 || code < 0 {
        return Err(capture_error(&output.stderr, &output.stdout));
    }

    let reports: Vec<LintFileReport> =
        serde_json::from_slice(&output.stdout).map_err(|e| {
            format!("could not parse {} --format json output: {e}", config.lint_cmd)
        })?;
    let mut rules: Vec<String> = reports
        .iter()
        .flat_map(|r| r.messages.iter())
        .filter_map(|m| m.rule_id.clone())
        .collect();
    rules.sort();
    rules.dedup();
    Ok(rules)
}

/// Prepend an `eslint-disable` block naming the remaining violations.
pub fn prepend_disable_comment(file: &Path, rules: &[String]) -> Result<(), PipelineError> {
    if rules.is_empty() {
        return Ok(());
    }
    let contents = std::fs::read_to_string(file).map_err(|e| io_err(file, e))?;
    let mut block = String::from("/* eslint-disable\n");
    for rule in rules {
        block.push_str(&format!("    {rule},\n"));
    }
    block.push_str("*/\n");
    std::fs::write(file, format!("{block}{contents}")).map_err(|e| io_err(file, e))?;
    Ok(())
}

fn capture_error(stderr: &[u8], stdout: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(stdout).into_owned()
    } else {
        stderr.into_owned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
