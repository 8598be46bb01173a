//! # molt-pipeline
//!
//! The conversion pipeline: backup management, external tool runners, the
//! ordered stage sequencer with git checkpointing, and the result reporter.
//!
//! Call [`run_conversion`] for the full pipeline, [`dry_run`] for `check`,
//! and [`backup::clean`] for the explicit backup cleanup operation.

pub mod backup;
pub mod error;
pub mod external;
pub mod report;
pub mod runner;
mod stages;

pub use error::PipelineError;
pub use report::{ConversionReport, ReportEntry};
pub use runner::{dry_run, run_conversion, Checkpoint, ConversionOutcome};
