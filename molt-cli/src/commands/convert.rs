//! `molt convert` — the full staged conversion pipeline.

use anyhow::{Context, Result};
use clap::Args;

use molt_core::{selector, Config};
use molt_git::GitRepo;
use molt_pipeline::report::count_phrase;
use molt_pipeline::{run_conversion, ConversionReport};

use super::super::SelectionArgs;
use super::print_summary;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

impl ConvertArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let repo = GitRepo::open(&cwd)?;
        let config = Config::load_from(&cwd)?;
        let files = selector::resolve(&self.selection.to_selection(), &config, &cwd)?;

        println!(
            "Converting {} with {}...",
            count_phrase(files.len(), "file"),
            config.transpiler_cmd
        );
        let outcome = run_conversion(&repo, &config, files)?;

        for notice in &outcome.notices {
            println!("{notice}");
        }
        if let Some(fix) = &outcome.fix_outcome {
            if !fix.touched.is_empty() {
                println!("Fixed imports in {}.", count_phrase(fix.touched.len(), "file"));
            }
        }

        let report = ConversionReport::from_tasks(&outcome.tasks);
        report.write_files(&cwd)?;
        print_summary(
            &report,
            format!(
                "Successfully ran {} on {}.",
                config.transpiler_cmd,
                count_phrase(report.entries.len(), "file")
            ),
        );
        Ok(())
    }
}
