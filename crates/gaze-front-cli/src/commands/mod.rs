//! CLI command definitions and handlers.

pub mod detect;
pub mod models;

use clap::{Parser, Subcommand};

/// Gaze Front - face detection and eye localization for gaze estimation
#[derive(Parser)]
#[command(name = "gaze-front")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Detect faces and locate eyes in images
    Detect(detect::DetectArgs),
    /// Inspect the models directory
    Models(models::ModelsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every requested operation ran.
    Success = 0,
    /// Configuration, model loading or output failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
