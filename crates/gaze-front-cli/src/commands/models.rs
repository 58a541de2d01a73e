//! Models command - inspect the models directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use gaze_front_adapters::{list_models as adapter_list_models, models_dir, MODELS};

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// List known models and whether they are installed
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    let dir = args
        .models_dir
        .clone()
        .or_else(|| config.models.dir.clone())
        .unwrap_or_else(models_dir);

    match args.command {
        ModelsCommand::List => list_models(&dir),
        ModelsCommand::Path => print_path(&dir),
    }
}

#[allow(clippy::unnecessary_wraps)]
fn list_models(dir: &std::path::Path) -> Result<()> {
    let models = adapter_list_models(dir);

    println!("Models directory: {}", dir.display());
    println!();

    for model in &models {
        let status = if model.installed { "✓" } else { "✗" };
        let description = MODELS
            .iter()
            .find(|m| m.name == model.name)
            .map_or("", |m| m.description);
        println!(
            "  {status} {} ({}.json + .safetensors) {description}",
            model.name,
            model.stem.display()
        );
    }

    println!();
    let installed_count = models.iter().filter(|m| m.installed).count();
    println!("{}/{} models installed", installed_count, models.len());

    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn print_path(dir: &std::path::Path) -> Result<()> {
    println!("{}", dir.display());
    Ok(())
}
