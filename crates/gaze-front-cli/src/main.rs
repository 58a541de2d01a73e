//! Gaze Front CLI - face detection and eye localization for gaze estimation.

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{detect::DetectArgs, Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Commands::Detect(args) => {
            let args = DetectArgs::with_config(args, &config);
            match commands::detect::run(&args) {
                Ok(result) => {
                    info!("{}", result.summary());
                    if result.processed == 0 && result.skipped > 0 {
                        warn!("No image could be processed ({} skipped)", result.skipped);
                    }
                    result.exit_code
                }
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::Error
                }
            }
        }
        Commands::Models(ref args) => match commands::models::run(args, &config) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
    };

    exit_code.into()
}
