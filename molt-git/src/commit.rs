//! Checkpoint commits.
//!
//! A checkpoint stages an exact file set and commits it in one step. Commit
//! hooks are always bypassed: an automated multi-stage migration must not be
//! blocked by interactive developer hooks.

use std::path::PathBuf;

use crate::error::GitError;
use crate::repo::GitRepo;

/// An author identity override for a single commit.
///
/// Only the name is supplied; the email is resolved from `user.email` in the
/// repository's git config, leaving the repository-level identity untouched.
#[derive(Debug, Clone)]
pub struct AuthorOverride {
    pub name: String,
}

impl AuthorOverride {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl GitRepo {
    /// Stage exactly `files` and commit them with `message`.
    ///
    /// Deletions are staged too: a renamed file is committed by listing both
    /// its old and new path. Returns the new commit id.
    pub fn commit_files(
        &self,
        files: &[PathBuf],
        message: &str,
        author: Option<&AuthorOverride>,
    ) -> Result<String, GitError> {
        let mut add_args: Vec<&str> = vec!["add", "--"];
        let file_strings: Vec<String> = files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        add_args.extend(file_strings.iter().map(|s| s.as_str()));
        self.run(&add_args)?;

        let author_arg = match author {
            Some(author) => {
                let email = self.config_value("user.email")?;
                Some(format!("--author={} <{}>", author.name, email))
            }
            None => None,
        };

        // `--allow-empty` keeps the one-checkpoint-per-stage guarantee even
        // when a stage's tools happened to change nothing.
        let mut commit_args: Vec<&str> = vec!["commit", "--no-verify", "--allow-empty", "-m", message];
        if let Some(author_arg) = &author_arg {
            commit_args.push(author_arg);
        }
        self.run(&commit_args)?;

        log::info!("committed {} file(s): {message}", files.len());
        self.head_commit()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
