//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `electorate_geocoder` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use electorate_geocoder::initialization::init_logger_with;
use electorate_geocoder::{run_geocode, Config, Opt, PipelineError};

/// Exit code for a run stopped by rejected credentials.
const EXIT_DENIED: i32 = 2;
/// Conventional exit code for SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    // Load GOOGLE_API_KEY from .env in the current directory or next to the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_geocode(config).await {
        Ok(report) => {
            println!(
                "✅ Processed {} record{} ({} resolved, {} missed) in {:.1}s",
                report.processed,
                if report.processed == 1 { "" } else { "s" },
                report.resolved,
                report.missed,
                report.elapsed_seconds
            );
            println!(
                "Results saved in {} and {}",
                report.resolved_path.display(),
                report.missed_path.display()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("electorate_geocoder error: {:#}", e);
            process::exit(exit_code(&e));
        }
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<PipelineError>() {
        Some(PipelineError::Denied { .. }) => EXIT_DENIED,
        Some(PipelineError::Interrupted { .. }) => EXIT_INTERRUPTED,
        _ => 1,
    }
}
