//! CLI command for aggregating metrics from a saved decision set

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;

use slr_screening::contracts::{ScreeningDecision, Verdict};
use slr_screening::metrics;

use crate::output::{print_field, print_section, OutputFormat};

/// Arguments for the metrics command
#[derive(Args, Debug)]
pub struct MetricsCommands {
    /// Input file with a decision set (JSON array)
    #[arg(short, long)]
    pub decisions: PathBuf,

    /// Optional gold labels (JSON object of record id to verdict)
    #[arg(short, long)]
    pub labels: Option<PathBuf>,
}

/// Execute the metrics command
pub async fn execute(format: &OutputFormat, cmd: MetricsCommands) -> Result<()> {
    let decisions_json = std::fs::read_to_string(&cmd.decisions).context(format!(
        "Failed to read decisions file: {}",
        cmd.decisions.display()
    ))?;
    let decisions: Vec<ScreeningDecision> =
        serde_json::from_str(&decisions_json).context("Failed to parse decisions JSON")?;

    let metrics = match &cmd.labels {
        Some(path) => {
            let labels_json = std::fs::read_to_string(path)
                .context(format!("Failed to read labels file: {}", path.display()))?;
            let labels: HashMap<String, Verdict> =
                serde_json::from_str(&labels_json).context("Failed to parse labels JSON")?;
            metrics::aggregate_with_labels(&decisions, &labels)
        }
        None => metrics::aggregate(&decisions),
    };

    match format {
        OutputFormat::Table => {
            print_section("PRISMA Metrics");
            print_field("Mode", &metrics.mode.to_string());
            print_field("Retrieved", &metrics.total_retrieved.to_string());
            print_field("Screened", &metrics.total_screened.to_string());
            print_field("Included", &metrics.total_included.to_string());
            print_field("Excluded", &metrics.total_excluded.to_string());
            print_field("Precision", &format!("{:.3}", metrics.precision));
            print_field("Recall", &format!("{:.3}", metrics.recall));
            print_field("F1", &format!("{:.3}", metrics.f1));
            print_field("Accuracy", &format!("{:.3}", metrics.accuracy));

            println!("\n{}", "Confusion Matrix".bold());
            print_field("True Positives", &metrics.true_positives.to_string());
            print_field("False Positives", &metrics.false_positives.to_string());
            print_field("True Negatives", &metrics.true_negatives.to_string());
            print_field("False Negatives", &metrics.false_negatives.to_string());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    Ok(())
}
