//! molt — batch legacy-to-modern source conversion.
//!
//! # Usage
//!
//! ```text
//! molt check [--file <path>]... [--path-file <file>] [--dir <dir>]
//! molt convert [--file <path>]... [--path-file <file>] [--dir <dir>]
//! molt clean
//! ```
//!
//! `check` classifies which files the transpiler can convert and writes the
//! report files without touching anything. `convert` runs the full staged
//! pipeline with a git checkpoint commit after each stage. `clean` removes
//! the `*.original.*` backup files a conversion left behind.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{check::CheckArgs, clean::CleanArgs, convert::ConvertArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "molt",
    version,
    about = "Convert a codebase from a legacy dialect, one checkpointed stage at a time",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Dry-run the transpiler over the selected files and report results.
    Check(CheckArgs),

    /// Run the full conversion pipeline: rename, convert, post-process,
    /// lint autofix, and import fixing, committing after each stage.
    Convert(ConvertArgs),

    /// Delete the backup files left behind by a conversion run.
    Clean(CleanArgs),
}

// ---------------------------------------------------------------------------
// Shared file-selection flags
// ---------------------------------------------------------------------------

/// File selection flags shared by `check` and `convert`.
///
/// Explicit `--file` flags win over `--path-file`, which wins over the
/// config file, which wins over recursive discovery under `--dir` (or the
/// current directory).
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Select a single file (repeatable).
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<std::path::PathBuf>,

    /// Read the files to convert from a text file, one path per line.
    #[arg(long, value_name = "FILE")]
    pub path_file: Option<std::path::PathBuf>,

    /// Search this directory instead of the current one.
    #[arg(long, short = 'd', value_name = "DIR")]
    pub dir: Option<std::path::PathBuf>,
}

impl SelectionArgs {
    fn to_selection(&self) -> molt_core::selector::Selection {
        molt_core::selector::Selection {
            files: self.files.clone(),
            path_file: self.path_file.clone(),
            search_dir: self.dir.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Convert(args) => args.run(),
        Commands::Clean(args) => args.run(),
    }
}
