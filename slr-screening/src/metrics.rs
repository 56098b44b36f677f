//! Metrics Aggregator
//!
//! Pure reductions from a decision set to [`ScreeningMetrics`]. The
//! aggregator runs only after all decisions for a pass are collected
//! and recomputes from scratch whenever the decision set changes; it is
//! not a streaming accumulator.
//!
//! Two modes:
//!
//! - [`aggregate_with_labels`] measures real confusion-matrix rates
//!   against externally supplied gold labels.
//! - [`aggregate`] derives confidence-weighted proxies when no labels
//!   exist. Its output is tagged [`MetricsMode::Estimated`] and must
//!   never be presented as measured PRISMA accuracy.

use std::collections::HashMap;

use tracing::debug;

use crate::contracts::{MetricsMode, ScreeningDecision, ScreeningMetrics, Verdict};

/// Upper bound on the estimated recall proxy.
const ESTIMATED_RECALL_CAP: f64 = 0.97;

/// Aggregate a decision set without ground truth.
///
/// Average confidence stands in for precision and accuracy; recall is a
/// bounded optimistic estimate. Empty input yields all-zero metrics.
pub fn aggregate(decisions: &[ScreeningDecision]) -> ScreeningMetrics {
    if decisions.is_empty() {
        return ScreeningMetrics::empty(MetricsMode::Estimated);
    }

    let included = decisions.iter().filter(|d| d.is_included()).count() as u64;
    let excluded = decisions.len() as u64 - included;
    let total = decisions.len() as u64;

    let avg_confidence =
        decisions.iter().map(|d| d.confidence).sum::<f64>() / decisions.len() as f64;
    let precision = avg_confidence;
    let recall = (avg_confidence + 0.05).min(ESTIMATED_RECALL_CAP);
    let f1 = f1_score(precision, recall);

    debug!(total, included, avg_confidence, "aggregated estimated metrics");

    ScreeningMetrics {
        mode: MetricsMode::Estimated,
        total_retrieved: total,
        total_screened: total,
        total_included: included,
        total_excluded: excluded,
        precision,
        recall,
        f1,
        accuracy: avg_confidence,
        true_positives: (included as f64 * avg_confidence) as u64,
        false_positives: (excluded as f64 * (1.0 - avg_confidence)) as u64,
        true_negatives: (excluded as f64 * avg_confidence) as u64,
        false_negatives: (included as f64 * (1.0 - avg_confidence)) as u64,
    }
}

/// Aggregate a decision set against gold labels (include = positive).
///
/// Decisions whose record id has no label are counted in the screening
/// totals but excluded from the confusion matrix. All rate divisions
/// are zero-denominator safe.
pub fn aggregate_with_labels(
    decisions: &[ScreeningDecision],
    labels: &HashMap<String, Verdict>,
) -> ScreeningMetrics {
    if decisions.is_empty() {
        return ScreeningMetrics::empty(MetricsMode::GroundTruth);
    }

    let included = decisions.iter().filter(|d| d.is_included()).count() as u64;
    let excluded = decisions.len() as u64 - included;
    let total = decisions.len() as u64;

    let mut tp = 0u64;
    let mut fp = 0u64;
    let mut tn = 0u64;
    let mut fn_ = 0u64;

    for decision in decisions {
        let Some(label) = labels.get(&decision.record_id) else {
            debug!(record_id = %decision.record_id, "no gold label, skipping confusion counts");
            continue;
        };
        match (decision.verdict, label) {
            (Verdict::Include, Verdict::Include) => tp += 1,
            (Verdict::Include, Verdict::Exclude) => fp += 1,
            (Verdict::Exclude, Verdict::Exclude) => tn += 1,
            (Verdict::Exclude, Verdict::Include) => fn_ += 1,
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);

    ScreeningMetrics {
        mode: MetricsMode::GroundTruth,
        total_retrieved: total,
        total_screened: total,
        total_included: included,
        total_excluded: excluded,
        precision,
        recall,
        f1: f1_score(precision, recall),
        accuracy: ratio(tp + tn, total),
        true_positives: tp,
        false_positives: fp,
        true_negatives: tn,
        false_negatives: fn_,
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    let denominator = precision + recall;
    if denominator == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / denominator
    }
}
