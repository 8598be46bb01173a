//! # molt-core
//!
//! Domain types, configuration, and file selection for the molt conversion
//! pipeline. This crate holds everything the other crates agree on: what a
//! [`types::FileTask`] is, how `molt.config.json` is shaped, and how the set
//! of legacy files for a run is resolved.

pub mod config;
pub mod error;
pub mod selector;
pub mod types;

pub use config::{CodemodScript, Config};
pub use error::CoreError;
pub use types::{sort_tasks, Extension, FileTask, TaskStatus};
