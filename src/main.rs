//! ezbackup CLI
//!
//! Concurrent, incremental backup of user-chosen files and directories.

use clap::Parser;
use ezbackup::config::{BackupConfig, CliArgs};
use ezbackup::core::{BackupEngine, RunOutcome};
use ezbackup::error::Result;
use ezbackup::progress::ProgressReporter;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    // Parse CLI arguments
    let args = CliArgs::parse();

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: CliArgs) -> Result<i32> {
    let quiet = args.quiet;
    let show_progress = args.progress && !quiet;

    let config = BackupConfig::from_cli(&args)?;

    let progress = if show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::disabled()
    };

    let engine = BackupEngine::new(config).with_progress(progress);
    let summary = engine.execute()?;

    if !quiet {
        summary.print_summary();
    }

    let code = match summary.outcome {
        RunOutcome::Completed => 0,
        RunOutcome::Failed => 1,
        RunOutcome::Cancelled => 2,
    };
    Ok(code)
}
