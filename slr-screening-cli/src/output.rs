//! Output formatting helpers

use clap::ValueEnum;
use colored::Colorize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Machine-readable JSON
    Json,
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "=".repeat(50));
}

/// Print a labelled field
pub fn print_field(label: &str, value: &str) {
    println!("  {}: {}", label.bold(), value);
}
