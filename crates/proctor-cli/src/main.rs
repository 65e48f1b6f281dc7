//! Proctor - Main Entry Point

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use proctor_cli::{analyze_files, init_logging, Preset, ProctorSettings};
use session::SessionOrchestrator;
use tracing::info;

/// Proctor - behavioural analysis of recorded exam sessions
#[derive(Parser)]
#[command(name = "proctor")]
#[command(version)]
#[command(about = "Score recorded exam sessions for suspicious behaviour", long_about = None)]
struct Cli {
    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Starting point for session settings
    #[arg(long, value_enum, default_value = "balanced", global = true)]
    preset: Preset,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one or more measurement files
    Analyze {
        /// Session files (JSON)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write the reports here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Print the effective settings
    Defaults,
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.context("Failed to encode JSON")
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = ProctorSettings::load(cli.preset, cli.config.as_deref())?;

    match cli.command {
        Commands::Defaults => {
            println!("{}", to_json(&settings, true)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze {
            inputs,
            output,
            pretty,
        } => {
            init_logging(&settings.logging)?;
            info!("=== Proctor v{} ===", env!("CARGO_PKG_VERSION"));

            let orchestrator = Arc::new(SessionOrchestrator::new(settings.session)?);
            let outputs = analyze_files(orchestrator, inputs).await?;
            let json = to_json(&outputs, pretty)?;

            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => writeln!(std::io::stdout(), "{}", json).context("Failed to write reports")?,
            }

            if outputs.iter().all(|o| o.is_ok()) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
