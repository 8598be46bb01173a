pub mod check;
pub mod clean;
pub mod convert;

use colored::Colorize;

use molt_pipeline::report::{ERRORS_FILE, RESULTS_FILE, SUCCESSFUL_FILES_FILE};
use molt_pipeline::{report::count_phrase, ConversionReport};

/// Print the per-file outcome summary shared by `check` and `convert`.
pub(crate) fn print_summary(report: &ConversionReport, success_line: String) {
    if report.failure_count() == 0 {
        println!("{}", success_line.as_str().green());
    } else {
        let failed = format!(
            "{} failed to convert.",
            count_phrase(report.failure_count(), "file")
        );
        println!("{}", failed.as_str().red());
        println!("Results: {RESULTS_FILE}");
        println!("Error details: {ERRORS_FILE}");
        println!("Successfully converted files: {SUCCESSFUL_FILES_FILE}");
    }
}
