//! `molt check` — dry-run the transpiler and report what would convert.

use anyhow::{Context, Result};
use clap::Args;

use molt_core::{selector, Config};
use molt_pipeline::report::count_phrase;
use molt_pipeline::{dry_run, ConversionReport};

use super::super::SelectionArgs;
use super::print_summary;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let config = Config::load_from(&cwd)?;
        let files = selector::resolve(&self.selection.to_selection(), &config, &cwd)?;

        println!(
            "Doing a dry run of {} on {}...",
            config.transpiler_cmd,
            count_phrase(files.len(), "file")
        );
        let tasks = dry_run(&config, files);

        let report = ConversionReport::from_tasks(&tasks);
        report.write_files(&cwd)?;
        print_summary(
            &report,
            format!(
                "All checks succeeded. {} can convert {}.",
                config.transpiler_cmd,
                count_phrase(report.entries.len(), "file")
            ),
        );
        Ok(())
    }
}
