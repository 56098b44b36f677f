//! PRISMA Metrics Schema
//!
//! Aggregate counts and accuracy figures for a completed screening
//! pass. The `mode` flag distinguishes measured ground-truth metrics
//! from confidence-weighted estimates so that downstream consumers can
//! never mistake one for the other.

use serde::{Deserialize, Serialize};

/// How the rate fields of [`ScreeningMetrics`] were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsMode {
    /// Confusion-matrix comparison against externally supplied gold
    /// labels; rates are measured.
    GroundTruth,
    /// No gold labels were available; rates are confidence-weighted
    /// proxies and MUST NOT be presented as measured PRISMA accuracy.
    Estimated,
}

impl std::fmt::Display for MetricsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GroundTruth => write!(f, "ground_truth"),
            Self::Estimated => write!(f, "estimated"),
        }
    }
}

/// PRISMA-style summary metrics for one screening pass.
///
/// Invariants: `total_included + total_excluded == total_screened`; all
/// rates lie in [0, 1]; an empty decision set yields all-zero values
/// rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningMetrics {
    /// Whether the rates below are measured or estimated.
    pub mode: MetricsMode,

    /// Records retrieved from the source.
    pub total_retrieved: u64,

    /// Records that received a screening decision.
    pub total_screened: u64,

    /// Records with an include verdict.
    pub total_included: u64,

    /// Records with an exclude verdict.
    pub total_excluded: u64,

    /// TP / (TP + FP), or the estimated proxy.
    pub precision: f64,
    /// TP / (TP + FN), or the estimated proxy.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// (TP + TN) / total_screened, or the estimated proxy.
    pub accuracy: f64,

    /// Included records whose gold label is include.
    pub true_positives: u64,
    /// Included records whose gold label is exclude.
    pub false_positives: u64,
    /// Excluded records whose gold label is exclude.
    pub true_negatives: u64,
    /// Excluded records whose gold label is include.
    pub false_negatives: u64,
}

impl ScreeningMetrics {
    /// All-zero metrics for an empty decision set.
    pub fn empty(mode: MetricsMode) -> Self {
        Self {
            mode,
            total_retrieved: 0,
            total_screened: 0,
            total_included: 0,
            total_excluded: 0,
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            accuracy: 0.0,
            true_positives: 0,
            false_positives: 0,
            true_negatives: 0,
            false_negatives: 0,
        }
    }
}
