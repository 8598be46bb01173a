//! # molt-git
//!
//! Thin wrapper around the `git` binary: working-tree status, checkpoint
//! commits with an exact file set, author override, and hook bypass.
//!
//! All state is carried by an explicit [`GitRepo`] handle; nothing here
//! depends on the process working directory.

pub mod commit;
pub mod error;
pub mod repo;

pub use commit::AuthorOverride;
pub use error::GitError;
pub use repo::GitRepo;
