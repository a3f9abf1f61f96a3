use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use migrant_core::{Config, MigrantError};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "migrant")]
#[command(about = "Simulated workload migration CLI", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.migrant/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the recorded metrics (Prometheus text format) to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every migration of a scenario and record the results
    Run {
        /// Scenario file (JSON workloads and migrations)
        scenario: PathBuf,

        /// Snapshot file (overrides the configured path)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Skip the simulated transfer time
        #[arg(long)]
        no_wait: bool,
    },

    /// List the objects stored in the snapshot
    Show {
        /// Snapshot file (overrides the configured path)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Delete the snapshot
    Purge {
        /// Snapshot file (overrides the configured path)
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            if is_client_error(&e) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

/// Bad input (exit code 2) as opposed to an operational failure.
fn is_client_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<MigrantError>())
        .any(MigrantError::is_client_error)
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let metrics = migrant_core::init_observability(&config.log_level)
        .map_err(|e| anyhow!("Failed to initialize observability: {}", e))?;

    let snapshot_path =
        |flag: Option<PathBuf>| flag.unwrap_or_else(|| PathBuf::from(&config.snapshot_path));

    match cli.command {
        Commands::Run { scenario, snapshot, no_wait } => {
            commands::run(&config, &scenario, &snapshot_path(snapshot), no_wait).await?;
        }

        Commands::Show { snapshot } => {
            commands::show(&snapshot_path(snapshot)).await?;
        }

        Commands::Init { force } => {
            commands::init(&config, cli.config.as_deref(), force)?;
        }

        Commands::Purge { snapshot } => {
            commands::purge(&snapshot_path(snapshot)).await?;
        }
    }

    if cli.metrics {
        eprint!("{}", metrics.render());
    }

    Ok(())
}
