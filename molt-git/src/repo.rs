//! Explicit repository handle.
//!
//! Every component that touches version control receives a [`GitRepo`]
//! instead of relying on ambient working-directory state. All subprocess
//! invocations go through [`GitRepo::run`], which runs `git -C <root>` so the
//! caller's working directory is irrelevant.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GitError;

/// A handle to one git working tree.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `root`.
    ///
    /// Fails with [`GitError::NotARepository`] when `root` is not inside a
    /// git working tree.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, GitError> {
        let root = root.into();
        let repo = Self { root };
        match repo.run(&["rev-parse", "--git-dir"]) {
            Ok(_) => Ok(repo),
            Err(GitError::CommandFailed { .. }) => Err(GitError::NotARepository {
                path: repo.root,
            }),
            Err(e) => Err(e),
        }
    }

    /// The working tree root this handle was opened at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `git -C <root> <args>` and return trimmed stdout.
    pub(crate) fn run(&self, args: &[&str]) -> Result<String, GitError> {
        log::debug!("git {}", args.join(" "));
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Paths with uncommitted changes, one `status --porcelain` entry each.
    ///
    /// Untracked files count as changes: a conversion must start from a
    /// state where every file is reproducible from a commit.
    pub fn changed_paths(&self) -> Result<Vec<String>, GitError> {
        let stdout = self.run(&["status", "--porcelain"])?;
        Ok(stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.get(3..).unwrap_or(l).to_owned())
            .collect())
    }

    /// Whether the working tree has no uncommitted changes.
    pub fn is_clean(&self) -> Result<bool, GitError> {
        Ok(self.changed_paths()?.is_empty())
    }

    /// Paths with uncommitted changes to *tracked* files.
    ///
    /// Untracked files are excluded; conversion backups live in the tree as
    /// untracked files and must not block later stages.
    pub fn tracked_changed_paths(&self) -> Result<Vec<String>, GitError> {
        let stdout = self.run(&["status", "--porcelain"])?;
        Ok(stdout
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.starts_with("??"))
            .map(|l| l.get(3..).unwrap_or(l).to_owned())
            .collect())
    }

    // -----------------------------------------------------------------------
    // Config / log
    // -----------------------------------------------------------------------

    /// Read a git config value, erroring when the key is unset.
    pub fn config_value(&self, key: &str) -> Result<String, GitError> {
        match self.run(&["config", "--get", key]) {
            Ok(value) if !value.is_empty() => Ok(value),
            Ok(_) | Err(GitError::CommandFailed { .. }) => Err(GitError::ConfigMissing {
                key: key.to_owned(),
            }),
            Err(e) => Err(e),
        }
    }

    /// The commit id at HEAD.
    pub fn head_commit(&self) -> Result<String, GitError> {
        self.run(&["rev-parse", "HEAD"])
    }

    /// Subject lines of the most recent commits, newest first.
    pub fn log_subjects(&self, limit: usize) -> Result<Vec<String>, GitError> {
        let n = limit.to_string();
        let stdout = self.run(&["log", "--format=%s", "-n", &n])?;
        Ok(stdout.lines().map(|l| l.to_owned()).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
