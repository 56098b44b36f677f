//! Decision Explanations
//!
//! Explainability metadata answering "why was this record included or
//! excluded" after a cascade pass.

use serde::{Deserialize, Serialize};

use super::decision::{DecisionLayer, Verdict};

/// Explanation for a single screening decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Identifier of the explained record.
    pub record_id: String,

    /// The verdict that was reached.
    pub verdict: Verdict,

    /// Layer that produced the final decision.
    pub layer: DecisionLayer,

    /// Reasoning carried on the decision.
    pub reasoning: String,

    /// Confidence of the deciding layer.
    pub confidence: f64,

    /// Supporting text snippets, e.g. matched keyword spans. Always
    /// present as an ordered sequence, possibly empty.
    pub evidence: Vec<String>,
}
