//! CLI argument parsing

use clap::{Parser, Subcommand};

use crate::commands::{metrics::MetricsCommands, screen::ScreenCommands};
use crate::output::OutputFormat;

/// SLR Screening CLI
///
/// A command-line tool for screening bibliographic study records
/// against systematic-review criteria and reporting PRISMA metrics.
#[derive(Parser, Debug)]
#[command(name = "slr")]
#[command(version)]
#[command(about = "CLI for the SLR screening cascade", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (table, json)
    #[arg(short, long, global = true, default_value = "table", env = "SLR_OUTPUT")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Screen a batch of study records against review criteria
    #[command(alias = "run")]
    Screen(ScreenCommands),

    /// Aggregate PRISMA metrics from a saved decision set
    #[command(alias = "met")]
    Metrics(MetricsCommands),
}
