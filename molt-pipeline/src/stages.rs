//! The four file-set stages: rename, convert, post-process, lint-fix.
//!
//! Every stage function takes the explicit task collection, mutates task
//! statuses, and describes what the sequencer should commit. Per-file work
//! inside a stage runs on the rayon worker pool; a stage never commits
//! itself — the join happens in the runner before the checkpoint.
//!
//! Failure semantics: a per-file failure marks the task `Failed` and drops it
//! from later stages, but never aborts the run. The one exception is rename,
//! whose collision check is a repository-wide precondition verified before
//! any file is touched.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;

use molt_core::{CodemodScript, Config, FileTask, TaskStatus};
use molt_git::GitRepo;

use crate::backup;
use crate::error::{io_err, PipelineError};
use crate::external;
use crate::report::file_set_phrase;

/// Shared read-only state for stage functions.
pub(crate) struct StageContext<'a> {
    pub repo: &'a GitRepo,
    pub config: &'a Config,
    pub scripts: &'a [CodemodScript],
}

/// What the sequencer should do after a stage ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StageRun {
    /// At least one file succeeded: commit `files` with `message`.
    Commit { message: String, files: Vec<PathBuf> },
    /// No file succeeded (or none were active); nothing to commit.
    Nothing,
    /// The stage did not apply; tell the user why.
    Skipped { notice: String },
}

// ---------------------------------------------------------------------------
// Per-file execution
// ---------------------------------------------------------------------------

/// Run `work` over every still-active task on the worker pool.
///
/// Successes optionally move to `on_success`; failures record the error and
/// exclude the task from later stages. Results are folded back in index
/// order, so outcome aggregation is deterministic.
fn apply_per_file<F>(tasks: &mut [FileTask], on_success: Option<TaskStatus>, work: F)
where
    F: Fn(&FileTask) -> Result<(), String> + Sync,
{
    let results: Vec<(usize, Result<(), String>)> = tasks
        .par_iter()
        .enumerate()
        .filter(|(_, task)| task.is_active())
        .map(|(i, task)| (i, work(task)))
        .collect();
    for (i, result) in results {
        match result {
            Ok(()) => {
                if let Some(status) = &on_success {
                    tasks[i].status = status.clone();
                }
            }
            Err(error) => tasks[i].fail(error),
        }
    }
}

fn active_tasks(tasks: &[FileTask]) -> Vec<&FileTask> {
    tasks.iter().filter(|t| t.is_active()).collect()
}

fn phrase(tasks: &[&FileTask]) -> String {
    let paths: Vec<&Path> = tasks.iter().map(|t| t.source_path.as_path()).collect();
    file_set_phrase(&paths)
}

// ---------------------------------------------------------------------------
// 1. Rename
// ---------------------------------------------------------------------------

/// Swap every active task's extension on disk.
///
/// A target that already exists is a hard precondition failure: the whole
/// run aborts before any file is renamed.
pub(crate) fn rename_stage(
    ctx: &StageContext<'_>,
    tasks: &mut [FileTask],
) -> Result<StageRun, PipelineError> {
    let active = active_tasks(tasks);
    if active.is_empty() {
        return Ok(StageRun::Nothing);
    }
    for task in &active {
        if task.target_path.exists() {
            return Err(PipelineError::RenameCollision {
                target: task.target_path.clone(),
            });
        }
    }
    for task in &active {
        std::fs::rename(&task.source_path, &task.target_path)
            .map_err(|e| io_err(&task.source_path, e))?;
    }

    let message = format!(
        "molt: Rename {} from {} to {}",
        phrase(&active),
        ctx.config.legacy_ext.dotted(),
        ctx.config.target_ext.dotted()
    );
    let mut files: Vec<PathBuf> = Vec::with_capacity(active.len() * 2);
    for task in &active {
        files.push(task.source_path.clone());
        files.push(task.target_path.clone());
    }
    Ok(StageRun::Commit { message, files })
}

// ---------------------------------------------------------------------------
// 2. Convert
// ---------------------------------------------------------------------------

/// The marker header prepended to every converted file.
///
/// The second line tells the user what is still expected of them: fixing
/// lint issues when the lint stage will run, a manual sanity check when it
/// will not.
fn conversion_header(lint_will_run: bool, mocha_env: bool) -> String {
    let mut header = String::from("// TODO: This file was created by molt.\n");
    if lint_will_run {
        header.push_str("// Fix any style issues and re-enable lint.\n");
    } else {
        header.push_str("// Sanity-check the conversion and remove this comment.\n");
    }
    if mocha_env {
        header.push_str("/* eslint-env mocha */\n");
    }
    header
}

/// Transpile one task in place; see [`convert_stage`] for the contract.
fn convert_one(
    config: &Config,
    lint_will_run: bool,
    mocha_re: Option<&Regex>,
    task: &FileTask,
) -> Result<(), String> {
    let backup = backup::create(&task.target_path, &config.legacy_ext).map_err(|e| e.to_string())?;
    let converted = external::run_transpiler(config, &backup)?;
    let mocha_env =
        mocha_re.is_some_and(|re| re.is_match(&task.target_path.to_string_lossy()));
    let output = format!("{}{converted}", conversion_header(lint_will_run, mocha_env));
    if let Err(e) = std::fs::write(&task.target_path, output) {
        // A partial write must not survive; put the legacy content back.
        backup::restore(&task.target_path, &config.legacy_ext).ok();
        return Err(format!("could not write {}: {e}", task.target_path.display()));
    }
    Ok(())
}

/// Transpile every active task in place.
///
/// The legacy content is backed up to `<stem>.original.<legacy_ext>` first;
/// the transpiler reads the backup, and its stdout, prefixed with the marker
/// header, replaces the target file. On failure the target keeps its legacy
/// content
/// and the backup persists until the user runs `clean`.
pub(crate) fn convert_stage(
    ctx: &StageContext<'_>,
    tasks: &mut [FileTask],
) -> Result<StageRun, PipelineError> {
    let config = ctx.config;
    let lint_will_run =
        !config.skip_lint_fix && external::find_lint_config(ctx.repo.root()).is_some();
    let mocha_re = match &config.mocha_env_file_pattern {
        Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
            PipelineError::MochaPattern {
                pattern: pattern.clone(),
                source,
            }
        })?),
        None => None,
    };
    apply_per_file(tasks, Some(TaskStatus::Converted), |task| {
        convert_one(config, lint_will_run, mocha_re.as_ref(), task)
    });

    let active = active_tasks(tasks);
    if active.is_empty() {
        return Ok(StageRun::Nothing);
    }
    let message = format!(
        "molt: Convert {} to {}",
        phrase(&active),
        config.target_ext.dotted()
    );
    Ok(StageRun::Commit {
        message,
        files: active.iter().map(|t| t.target_path.clone()).collect(),
    })
}

// ---------------------------------------------------------------------------
// 3. Post-process
// ---------------------------------------------------------------------------

/// Run every resolved codemod script over each converted file.
pub(crate) fn postprocess_stage(
    ctx: &StageContext<'_>,
    tasks: &mut [FileTask],
) -> Result<StageRun, PipelineError> {
    if ctx.scripts.is_empty() {
        return Ok(StageRun::Skipped {
            notice: "No codemod scripts configured; skipping post-processing.".to_owned(),
        });
    }
    let config = ctx.config;
    let scripts = ctx.scripts;
    apply_per_file(tasks, None, |task| {
        for script in scripts {
            external::run_codemod(config, script, &task.target_path)?;
        }
        Ok(())
    });

    let active = active_tasks(tasks);
    if active.is_empty() {
        return Ok(StageRun::Nothing);
    }
    let message = format!("molt: Run post-processing cleanups on {}", phrase(&active));
    Ok(StageRun::Commit {
        message,
        files: active.iter().map(|t| t.target_path.clone()).collect(),
    })
}

// ---------------------------------------------------------------------------
// 4. Lint-fix
// ---------------------------------------------------------------------------

/// Run the linter with autofix, then pin remaining violations with an
/// `eslint-disable` block. Skipped with a notice when no lint config is
/// discoverable — that is informational, not an error.
pub(crate) fn lint_stage(
    ctx: &StageContext<'_>,
    tasks: &mut [FileTask],
) -> Result<StageRun, PipelineError> {
    if ctx.config.skip_lint_fix {
        return Ok(StageRun::Skipped {
            notice: "Skipping lint autofix (disabled in config).".to_owned(),
        });
    }
    if external::find_lint_config(ctx.repo.root()).is_none() {
        return Ok(StageRun::Skipped {
            notice: "Skipping lint autofix because there was no eslint config file.".to_owned(),
        });
    }

    let config = ctx.config;
    apply_per_file(tasks, None, |task| {
        let remaining = external::run_lint_fix(config, &task.target_path)?;
        external::prepend_disable_comment(&task.target_path, &remaining)
            .map_err(|e| e.to_string())
    });

    let active = active_tasks(tasks);
    if active.is_empty() {
        return Ok(StageRun::Nothing);
    }
    let message = format!("molt: Run lint autofix on {}", phrase(&active));
    Ok(StageRun::Commit {
        message,
        files: active.iter().map(|t| t.target_path.clone()).collect(),
    })
}

// ---------------------------------------------------------------------------
// Dry-run classification
// ---------------------------------------------------------------------------

/// Run the transpiler over each legacy source, recording success or failure
/// without writing anything. Used by `check`.
pub(crate) fn classify_only(config: &Config, tasks: &mut [FileTask]) {
    apply_per_file(tasks, Some(TaskStatus::Converted), |task| {
        external::run_transpiler(config, &task.source_path).map(|_| ())
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
