//! The stage sequencer.
//!
//! Stages run strictly in order — rename, convert, post-process, lint-fix,
//! fix-imports — and each stage's checkpoint commit completes before the next
//! stage starts. Per-file work inside a stage is parallel; the sequence is
//! not. All version-control mutation goes through [`GitRepo::commit_files`],
//! the single synchronization point at each stage boundary.

use std::path::PathBuf;

use molt_core::{sort_tasks, CodemodScript, Config, FileTask, TaskStatus};
use molt_fixer::FixOutcome;
use molt_git::{AuthorOverride, GitRepo};

use crate::error::PipelineError;
use crate::external::BUILTIN_CODEMOD_NAMES;
use crate::report::count_phrase;
use crate::stages::{self, StageContext, StageRun};

/// Author name stamped on every checkpoint commit.
const COMMIT_AUTHOR: &str = "molt";

/// One committed pipeline checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub stage: &'static str,
    pub message: String,
    pub commit_id: String,
}

/// Everything a conversion run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// Final task states, sorted by source path.
    pub tasks: Vec<FileTask>,
    /// Checkpoints in the order they were committed.
    pub checkpoints: Vec<Checkpoint>,
    /// User-facing notices for skipped stages.
    pub notices: Vec<String>,
    /// What the import fixer did, when it ran.
    pub fix_outcome: Option<FixOutcome>,
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

/// Run the full conversion pipeline over `files`.
///
/// Preconditions (checked before any mutation): the working tree has no
/// uncommitted changes to tracked files, and no rename target exists yet.
/// Per-file failures in the convert/post-process/lint stages isolate the
/// file and continue; the final task states describe exactly what happened.
pub fn run_conversion(
    repo: &GitRepo,
    config: &Config,
    files: Vec<PathBuf>,
) -> Result<ConversionOutcome, PipelineError> {
    let dirty = repo.tracked_changed_paths()?;
    if !dirty.is_empty() {
        return Err(PipelineError::DirtyWorktree { changed: dirty });
    }

    // Resolve codemod scripts up front so a bad config aborts pre-mutation.
    let scripts: Vec<CodemodScript> = config
        .codemod_scripts
        .iter()
        .map(|raw| CodemodScript::resolve(raw, BUILTIN_CODEMOD_NAMES))
        .collect::<Result<_, _>>()?;

    let mut tasks: Vec<FileTask> = files
        .into_iter()
        .map(|f| FileTask::new(f, &config.target_ext))
        .collect();
    sort_tasks(&mut tasks);

    let ctx = StageContext {
        repo,
        config,
        scripts: &scripts,
    };
    let mut outcome = ConversionOutcome {
        tasks: Vec::new(),
        checkpoints: Vec::new(),
        notices: Vec::new(),
        fix_outcome: None,
    };

    let stage_fns: [(&'static str, StageFn); 4] = [
        ("rename", stages::rename_stage),
        ("convert", stages::convert_stage),
        ("post-process", stages::postprocess_stage),
        ("lint-fix", stages::lint_stage),
    ];
    for (name, stage) in stage_fns {
        let run = stage(&ctx, &mut tasks)?;
        commit_stage(repo, name, run, &mut outcome)?;
    }

    run_fix_imports(repo, config, &tasks, &mut outcome)?;

    outcome.tasks = tasks;
    Ok(outcome)
}

type StageFn = fn(&StageContext<'_>, &mut [FileTask]) -> Result<StageRun, PipelineError>;

fn commit_stage(
    repo: &GitRepo,
    stage: &'static str,
    run: StageRun,
    outcome: &mut ConversionOutcome,
) -> Result<(), PipelineError> {
    match run {
        StageRun::Commit { message, files } => {
            let commit_id = repo.commit_files(
                &files,
                &message,
                Some(&AuthorOverride::new(COMMIT_AUTHOR)),
            )?;
            tracing::info!("checkpoint [{stage}]: {message}");
            outcome.checkpoints.push(Checkpoint {
                stage,
                message,
                commit_id,
            });
        }
        StageRun::Nothing => {
            tracing::info!("stage [{stage}] had no successful files; no checkpoint");
        }
        StageRun::Skipped { notice } => {
            tracing::info!("stage [{stage}] skipped: {notice}");
            outcome.notices.push(notice);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Fix imports (stage 5)
// ---------------------------------------------------------------------------

fn run_fix_imports(
    repo: &GitRepo,
    config: &Config,
    tasks: &[FileTask],
    outcome: &mut ConversionOutcome,
) -> Result<(), PipelineError> {
    if config.skip_fix_imports {
        outcome
            .notices
            .push("Skipping import fixing (disabled in config).".to_owned());
        return Ok(());
    }
    let converted: Vec<PathBuf> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Converted)
        .map(|t| t.target_path.clone())
        .collect();
    if converted.is_empty() {
        return Ok(());
    }

    outcome
        .notices
        .push("Fixing any imports across the whole codebase...".to_owned());
    let fix = molt_fixer::fix_imports(repo.root(), &converted, &config.target_ext)?;
    if !fix.touched.is_empty() {
        let message = format!(
            "molt: Fix imports in {}",
            count_phrase(fix.touched.len(), "file")
        );
        let commit_id = repo.commit_files(
            &fix.touched,
            &message,
            Some(&AuthorOverride::new(COMMIT_AUTHOR)),
        )?;
        outcome.checkpoints.push(Checkpoint {
            stage: "fix-imports",
            message,
            commit_id,
        });
    }
    outcome.fix_outcome = Some(fix);
    Ok(())
}

// ---------------------------------------------------------------------------
// check (dry run)
// ---------------------------------------------------------------------------

/// Classify which files would convert, without touching the tree.
///
/// Runs the transpiler over each legacy source on the worker pool and
/// discards its output; no renames, no writes, no commits. Needs no git
/// repository at all.
pub fn dry_run(config: &Config, files: Vec<PathBuf>) -> Vec<FileTask> {
    let mut tasks: Vec<FileTask> = files
        .into_iter()
        .map(|f| FileTask::new(f, &config.target_ext))
        .collect();
    sort_tasks(&mut tasks);
    stages::classify_only(config, &mut tasks);
    tasks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use molt_core::Extension;

    use super::*;
    use crate::test_support::{fake_transpiler, init_test_repo};

    fn test_config(dir: &Path) -> Config {
        Config {
            transpiler_cmd: fake_transpiler(dir),
            ..Config::default()
        }
    }

    #[test]
    fn full_run_commits_one_checkpoint_per_stage_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.coffee"), "x = 1\n").unwrap();
        fs::write(dir.path().join("B.coffee"), "y = 2\n").unwrap();
        let repo = init_test_repo(dir.path());
        let config = test_config(dir.path());

        let outcome = run_conversion(
            &repo,
            &config,
            vec![dir.path().join("A.coffee"), dir.path().join("B.coffee")],
        )
        .unwrap();

        let stages: Vec<&str> = outcome.checkpoints.iter().map(|c| c.stage).collect();
        assert_eq!(stages, vec!["rename", "convert"]);
        assert_eq!(
            outcome.checkpoints[0].message,
            "molt: Rename A.coffee and 1 other file from .coffee to .js"
        );
        assert_eq!(
            outcome.checkpoints[1].message,
            "molt: Convert A.coffee and 1 other file to .js"
        );

        // Post-process and lint were skipped with notices, not errors.
        assert_eq!(outcome.notices.len(), 3);

        // Converted files on disk, legacy files gone, backups kept.
        assert!(dir.path().join("A.js").exists());
        assert!(!dir.path().join("A.coffee").exists());
        assert!(dir.path().join("A.original.coffee").exists());
        let converted = fs::read_to_string(dir.path().join("A.js")).unwrap();
        assert!(converted.starts_with(
            "// TODO: This file was created by molt.\n\
             // Sanity-check the conversion and remove this comment.\n\
             // converted\n"
        ));

        // Tracked tree is clean; every task converted.
        assert!(repo.tracked_changed_paths().unwrap().is_empty());
        assert!(outcome
            .tasks
            .iter()
            .all(|t| t.status == TaskStatus::Converted));
    }

    #[test]
    fn singular_commit_messages_for_one_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.coffee"), "x = 1\n").unwrap();
        let repo = init_test_repo(dir.path());
        let config = test_config(dir.path());

        let outcome =
            run_conversion(&repo, &config, vec![dir.path().join("A.coffee")]).unwrap();
        assert_eq!(
            outcome.checkpoints[0].message,
            "molt: Rename A.coffee from .coffee to .js"
        );
        assert_eq!(
            outcome.checkpoints[1].message,
            "molt: Convert A.coffee to .js"
        );
    }

    #[test]
    fn per_file_failure_is_isolated_and_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.coffee"), "x = 1\n").unwrap();
        fs::write(dir.path().join("bad.coffee"), "FAIL here\n").unwrap();
        let repo = init_test_repo(dir.path());
        let config = test_config(dir.path());

        let outcome = run_conversion(
            &repo,
            &config,
            vec![dir.path().join("good.coffee"), dir.path().join("bad.coffee")],
        )
        .unwrap();

        let bad = outcome
            .tasks
            .iter()
            .find(|t| t.source_path.ends_with("bad.coffee"))
            .unwrap();
        assert_eq!(bad.status, TaskStatus::Failed);
        assert!(bad.error.as_deref().unwrap().contains("unexpected token"));

        // The convert checkpoint names only the surviving file.
        assert_eq!(
            outcome.checkpoints[1].message,
            "molt: Convert good.coffee to .js"
        );
        // The failed file keeps its legacy content at the renamed path and
        // its backup survives for recovery.
        let bad_content = fs::read_to_string(dir.path().join("bad.js")).unwrap();
        assert_eq!(bad_content, "FAIL here\n");
        assert!(dir.path().join("bad.original.coffee").exists());
    }

    #[test]
    fn dirty_worktree_aborts_with_no_mutation() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.coffee"), "x = 1\n").unwrap();
        let repo = init_test_repo(dir.path());
        fs::write(dir.path().join("A.coffee"), "x = 2\n").unwrap();
        let config = test_config(dir.path());

        let err =
            run_conversion(&repo, &config, vec![dir.path().join("A.coffee")]).unwrap_err();
        assert!(matches!(err, PipelineError::DirtyWorktree { .. }));
        assert!(err.to_string().contains("modifications to your git worktree"));
        assert!(dir.path().join("A.coffee").exists(), "nothing may be renamed");
        assert!(!dir.path().join("A.js").exists());
    }

    #[test]
    fn rename_collision_aborts_before_any_rename() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.coffee"), "x = 1\n").unwrap();
        fs::write(dir.path().join("B.coffee"), "y = 2\n").unwrap();
        fs::write(dir.path().join("B.js"), "already here\n").unwrap();
        let repo = init_test_repo(dir.path());
        let config = test_config(dir.path());

        let err = run_conversion(
            &repo,
            &config,
            vec![dir.path().join("A.coffee"), dir.path().join("B.coffee")],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::RenameCollision { .. }));
        assert!(err.to_string().contains("B.js already exists"));
        // A sorts before B, but even A must not have been renamed.
        assert!(dir.path().join("A.coffee").exists());
        assert!(!dir.path().join("A.js").exists());
    }

    #[test]
    fn fixer_rewrites_importers_and_commits_separately() {
        let dir = TempDir::new().unwrap();
        // The fake transpiler passes content through, so the "legacy" file
        // already holds the converted module's final source.
        fs::write(dir.path().join("util.coffee"), "export function run() {}\n").unwrap();
        fs::write(
            dir.path().join("main.js"),
            "import util from './util';\nutil.run();\nwindow.util = util;\n",
        )
        .unwrap();
        let repo = init_test_repo(dir.path());
        let config = test_config(dir.path());

        let outcome =
            run_conversion(&repo, &config, vec![dir.path().join("util.coffee")]).unwrap();

        let last = outcome.checkpoints.last().unwrap();
        assert_eq!(last.stage, "fix-imports");
        assert_eq!(last.message, "molt: Fix imports in 1 file");

        let main = fs::read_to_string(dir.path().join("main.js")).unwrap();
        assert!(main.starts_with("import * as util from './util';"));
        assert!(repo.tracked_changed_paths().unwrap().is_empty());

        // Re-running the fixer over the fixed tree is a no-op.
        let again = molt_fixer::fix_imports(
            dir.path(),
            &[dir.path().join("util.js")],
            &Extension::from("js"),
        )
        .unwrap();
        assert!(again.touched.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn post_process_and_lint_stages_checkpoint_when_configured() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".eslintrc"), "{}\n").unwrap();
        fs::write(dir.path().join("tidy.js"), "// codemod body\n").unwrap();
        fs::write(dir.path().join("A.coffee"), "x = 1\n").unwrap();
        fs::write(dir.path().join("A-test.coffee"), "t = 2\n").unwrap();
        let repo = init_test_repo(dir.path());
        let config = Config {
            transpiler_cmd: fake_transpiler(dir.path()),
            codemod_cmd: crate::test_support::fake_codemod(dir.path()),
            codemod_scripts: vec![dir.path().join("tidy.js").to_string_lossy().into_owned()],
            lint_cmd: crate::test_support::fake_linter(dir.path()),
            mocha_env_file_pattern: Some("-test\\.js$".to_owned()),
            ..Config::default()
        };

        let outcome = run_conversion(
            &repo,
            &config,
            vec![dir.path().join("A.coffee"), dir.path().join("A-test.coffee")],
        )
        .unwrap();

        let stages: Vec<&str> = outcome.checkpoints.iter().map(|c| c.stage).collect();
        assert_eq!(stages, vec!["rename", "convert", "post-process", "lint-fix"]);

        // Final layout: disable block, then the conversion header (the lint
        // variant, since an eslint config exists), then the converted source,
        // then the codemod's appended line.
        let plain = fs::read_to_string(dir.path().join("A.js")).unwrap();
        assert_eq!(
            plain,
            "/* eslint-disable\n    no-console,\n    no-unused-vars,\n*/\n\
             // TODO: This file was created by molt.\n\
             // Fix any style issues and re-enable lint.\n\
             // converted\nx = 1\n// codemod: tidy.js\n"
        );

        // Only paths matching mochaEnvFilePattern get the mocha env line.
        let test_file = fs::read_to_string(dir.path().join("A-test.js")).unwrap();
        assert!(test_file.contains("/* eslint-env mocha */\n// converted\n"));
        assert!(!plain.contains("eslint-env"));

        assert!(repo.tracked_changed_paths().unwrap().is_empty());
    }

    #[test]
    fn invalid_mocha_pattern_aborts_the_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.coffee"), "x = 1\n").unwrap();
        let repo = init_test_repo(dir.path());
        let config = Config {
            mocha_env_file_pattern: Some("-test\\.js$[".to_owned()),
            ..test_config(dir.path())
        };

        let err =
            run_conversion(&repo, &config, vec![dir.path().join("A.coffee")]).unwrap_err();
        assert!(matches!(err, PipelineError::MochaPattern { .. }));
    }

    #[test]
    fn dry_run_classifies_without_touching_anything() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.coffee"), "x = 1\n").unwrap();
        fs::write(dir.path().join("bad.coffee"), "FAIL\n").unwrap();
        let config = test_config(dir.path());

        let tasks = dry_run(
            &config,
            vec![dir.path().join("good.coffee"), dir.path().join("bad.coffee")],
        );
        assert_eq!(tasks[0].status, TaskStatus::Failed); // bad sorts first
        assert_eq!(tasks[1].status, TaskStatus::Converted);
        assert!(dir.path().join("good.coffee").exists());
        assert!(!dir.path().join("good.js").exists());
        assert!(!dir.path().join("bad.original.coffee").exists());
    }
}
