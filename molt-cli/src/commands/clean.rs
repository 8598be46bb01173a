//! `molt clean` — remove leftover `*.original.*` backup files.

use anyhow::{Context, Result};
use clap::Args;

use molt_core::Config;
use molt_pipeline::backup;
use molt_pipeline::report::count_phrase;

#[derive(Args, Debug)]
pub struct CleanArgs {}

impl CleanArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        let config = Config::load_from(&cwd)?;
        let removed = backup::clean(&cwd, &config.legacy_ext)?;
        if removed.is_empty() {
            println!("No backup files found.");
        } else {
            for path in &removed {
                println!("Removing {}", path.display());
            }
            println!("Removed {}.", count_phrase(removed.len(), "backup file"));
        }
        Ok(())
    }
}
