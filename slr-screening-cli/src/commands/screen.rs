//! CLI command for running a screening pass
//!
//! Reads study records and review criteria from JSON files, runs the
//! rule-gate cascade, and prints per-record decisions plus aggregate
//! PRISMA metrics.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::{Cell, Color, Table};

use slr_screening::contracts::{ReviewCriteria, ScreeningDecision, StudyRecord, Verdict};
use slr_screening::explain::ExplanationIndex;
use slr_screening::metrics;
use slr_screening::screening::{RuleGate, ScreeningCascade, ScreeningRun};

use crate::output::{print_field, print_section, OutputFormat};

/// Arguments for the screen command
#[derive(Args, Debug)]
pub struct ScreenCommands {
    /// Input file with study records (JSON array)
    #[arg(short, long)]
    pub records: PathBuf,

    /// Input file with review criteria (JSON object)
    #[arg(short, long)]
    pub criteria: PathBuf,

    /// Optional gold labels (JSON object of record id to verdict)
    #[arg(short, long)]
    pub labels: Option<PathBuf>,

    /// Record ids to explain after screening (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub explain: Option<Vec<String>>,

    /// Write the decision set to this file as JSON
    #[arg(long)]
    pub output_file: Option<PathBuf>,
}

/// Execute the screen command
pub async fn execute(format: &OutputFormat, cmd: ScreenCommands) -> Result<()> {
    let records_json = std::fs::read_to_string(&cmd.records)
        .context(format!("Failed to read records file: {}", cmd.records.display()))?;
    let records: Vec<StudyRecord> =
        serde_json::from_str(&records_json).context("Failed to parse records JSON")?;

    let criteria_json = std::fs::read_to_string(&cmd.criteria)
        .context(format!("Failed to read criteria file: {}", cmd.criteria.display()))?;
    let criteria: ReviewCriteria =
        serde_json::from_str(&criteria_json).context("Failed to parse criteria JSON")?;

    let labels = match &cmd.labels {
        Some(path) => {
            let labels_json = std::fs::read_to_string(path)
                .context(format!("Failed to read labels file: {}", path.display()))?;
            Some(
                serde_json::from_str::<HashMap<String, Verdict>>(&labels_json)
                    .context("Failed to parse labels JSON")?,
            )
        }
        None => None,
    };

    let cascade = ScreeningCascade::new(RuleGate::with_defaults()?);
    let run = cascade.run(&records, &criteria).await;

    let metrics = match &labels {
        Some(labels) => metrics::aggregate_with_labels(&run.decisions, labels),
        None => metrics::aggregate(&run.decisions),
    };

    match format {
        OutputFormat::Table => {
            display_decisions(&run.decisions);
            display_metrics(&metrics);
        }
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "decisions": run.decisions,
                "metrics": metrics,
                "criteria_hash": run.criteria_hash,
                "elapsed_ms": run.elapsed_ms,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    if let Some(ids) = &cmd.explain {
        display_explanations(&run, ids);
    }

    if let Some(path) = &cmd.output_file {
        let json = serde_json::to_string_pretty(&run.decisions)?;
        std::fs::write(path, json)
            .context(format!("Failed to write decisions to {}", path.display()))?;
        println!("\n{} {}", "Decisions written to:".green(), path.display());
    }

    Ok(())
}

fn display_decisions(decisions: &[ScreeningDecision]) {
    println!("\n{}", "Screening Decisions".bold());

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Record").fg(Color::Cyan),
        Cell::new("Verdict").fg(Color::Cyan),
        Cell::new("Layer").fg(Color::Cyan),
        Cell::new("Confidence").fg(Color::Cyan),
        Cell::new("Reasoning").fg(Color::Cyan),
    ]);

    for decision in decisions {
        let verdict = match decision.verdict {
            Verdict::Include => Cell::new("INCLUDE").fg(Color::Green),
            Verdict::Exclude => Cell::new("EXCLUDE").fg(Color::Red),
        };

        table.add_row(vec![
            Cell::new(&decision.record_id),
            verdict,
            Cell::new(decision.layer.to_string()),
            Cell::new(format!("{:.2}", decision.confidence)),
            Cell::new(&decision.reasoning),
        ]);
    }

    println!("{}", table);
}

fn display_metrics(metrics: &slr_screening::contracts::ScreeningMetrics) {
    print_section("PRISMA Metrics");
    print_field("Mode", &metrics.mode.to_string());
    print_field("Screened", &metrics.total_screened.to_string());
    print_field("Included", &metrics.total_included.to_string());
    print_field("Excluded", &metrics.total_excluded.to_string());
    print_field("Precision", &format!("{:.3}", metrics.precision));
    print_field("Recall", &format!("{:.3}", metrics.recall));
    print_field("F1", &format!("{:.3}", metrics.f1));
    print_field("Accuracy", &format!("{:.3}", metrics.accuracy));
}

fn display_explanations(run: &ScreeningRun, ids: &[String]) {
    let index = ExplanationIndex::from_run(run);

    print_section("Explanations");
    for id in ids {
        match index.get(id) {
            Some(explanation) => {
                println!();
                print_field("Record", &explanation.record_id);
                print_field("Verdict", &explanation.verdict.to_string());
                print_field("Layer", &explanation.layer.to_string());
                print_field("Confidence", &format!("{:.2}", explanation.confidence));
                print_field("Reasoning", &explanation.reasoning);
                if !explanation.evidence.is_empty() {
                    print_field("Evidence", &explanation.evidence.join(", "));
                }
            }
            None => {
                println!("\n  {} {}", "No decision recorded for:".yellow(), id);
            }
        }
    }
}
