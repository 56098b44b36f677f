//! Screening Decision Schema
//!
//! The decision is the primary output of the cascade: one per input
//! record, carrying provenance (which layer produced it), a
//! layer-specific confidence, and a human-readable reasoning string.
//!
//! Invariants:
//!
//! - `layer` records the LAST layer that actually executed and produced
//!   the decision, not the first.
//! - Once a record is excluded at any layer, no later layer may flip it
//!   back to include within the same pass.
//! - Decisions are created exactly once per (record, job) pair and never
//!   mutated; a revised decision is a new value.

use serde::{Deserialize, Serialize};

/// Include/exclude verdict for a study record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The record meets the review criteria.
    Include,
    /// The record is screened out.
    Exclude,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Include => write!(f, "INCLUDE"),
            Self::Exclude => write!(f, "EXCLUDE"),
        }
    }
}

/// Cascade layer that produced a decision.
///
/// Adding a layer here forces every consumption point to be revisited:
/// matches on this enum are exhaustive throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionLayer {
    /// Deterministic rule-based gate.
    Rules,
    /// Statistical classifier plugin.
    Ml,
    /// Semantic-similarity scorer plugin.
    Semantic,
    /// Manual review.
    Human,
}

impl std::fmt::Display for DecisionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Ml => write!(f, "ml"),
            Self::Semantic => write!(f, "semantic"),
            Self::Human => write!(f, "human"),
        }
    }
}

/// PRISMA reporting stage a decision belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrismaStage {
    /// Records identified through database searching.
    Identification,
    /// Records screened on title and abstract.
    Screening,
    /// Records included in the review.
    Inclusion,
}

impl std::fmt::Display for PrismaStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identification => write!(f, "identification"),
            Self::Screening => write!(f, "screening"),
            Self::Inclusion => write!(f, "inclusion"),
        }
    }
}

/// A screening decision with full provenance.
///
/// `confidence` is layer-specific and not comparable across layers
/// without normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningDecision {
    /// Identifier of the record this decision applies to.
    pub record_id: String,

    /// Include or exclude.
    pub verdict: Verdict,

    /// Certainty of the deciding layer, in [0, 1].
    pub confidence: f64,

    /// Last layer that executed and produced this decision.
    pub layer: DecisionLayer,

    /// Human-readable reasoning for auditing.
    pub reasoning: String,

    /// PRISMA stage the decision is reported under.
    pub prisma_stage: PrismaStage,
}

impl ScreeningDecision {
    /// Whether the record survived screening.
    pub fn is_included(&self) -> bool {
        self.verdict == Verdict::Include
    }
}
