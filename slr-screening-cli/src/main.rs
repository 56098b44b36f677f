//! SLR Screening CLI
//!
//! Command-line interface for running screening passes over study
//! records and aggregating PRISMA metrics.

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slr_screening=info".parse()?)
                .add_directive("warn".parse()?),
        )
        .with_target(false)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Screen(cmd) => commands::screen::execute(&cli.output, cmd).await,
        Commands::Metrics(cmd) => commands::metrics::execute(&cli.output, cmd).await,
    }
}
