//! Explanation Lookup
//!
//! Indexes the decisions of a completed screening pass by record id so
//! that "why was this record included/excluded" queries can be answered
//! after the fact. Built once per pass and discarded with the job.

use std::collections::HashMap;

use thiserror::Error;

use crate::contracts::{DecisionLayer, Explanation};
use crate::screening::ScreeningRun;

/// Reportable lookup failures. Neither is a crash: an unknown id or a
/// layer that never scored the record are caller errors surfaced as
/// structured results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExplainError {
    /// The record id has no decision in this pass.
    #[error("no screening decision recorded for '{0}'")]
    NotFound(String),

    /// The record was decided by a different layer than requested.
    #[error("record '{record_id}' was decided at layer '{actual}', not '{requested}'")]
    LayerMismatch {
        /// The queried record id.
        record_id: String,
        /// Layer the caller asked about.
        requested: DecisionLayer,
        /// Layer that actually produced the decision.
        actual: DecisionLayer,
    },
}

/// Per-pass index of explanations, keyed by record id.
#[derive(Debug, Clone, Default)]
pub struct ExplanationIndex {
    by_id: HashMap<String, Explanation>,
}

impl ExplanationIndex {
    /// Build the index from a completed pass. Evidence spans recorded
    /// by the rule gate are attached; records with no recorded spans
    /// get an empty evidence sequence.
    pub fn from_run(run: &ScreeningRun) -> Self {
        let by_id = run
            .decisions
            .iter()
            .map(|decision| {
                let evidence = run
                    .evidence
                    .get(&decision.record_id)
                    .cloned()
                    .unwrap_or_default();
                (
                    decision.record_id.clone(),
                    Explanation {
                        record_id: decision.record_id.clone(),
                        verdict: decision.verdict,
                        layer: decision.layer,
                        reasoning: decision.reasoning.clone(),
                        confidence: decision.confidence,
                        evidence,
                    },
                )
            })
            .collect();
        Self { by_id }
    }

    /// Explanation for a record, checked against the layer the caller
    /// believes decided it.
    pub fn explain(
        &self,
        record_id: &str,
        layer: DecisionLayer,
    ) -> Result<&Explanation, ExplainError> {
        let explanation = self
            .by_id
            .get(record_id)
            .ok_or_else(|| ExplainError::NotFound(record_id.to_string()))?;
        if explanation.layer != layer {
            return Err(ExplainError::LayerMismatch {
                record_id: record_id.to_string(),
                requested: layer,
                actual: explanation.layer,
            });
        }
        Ok(explanation)
    }

    /// Explanation for a record regardless of layer.
    pub fn get(&self, record_id: &str) -> Option<&Explanation> {
        self.by_id.get(record_id)
    }

    /// Number of indexed explanations.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the index holds no explanations.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ReviewCriteria, StudyRecord};
    use crate::screening::{RuleGate, ScreeningCascade};

    async fn fixture_run() -> ScreeningRun {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let records = vec![
            StudyRecord::new("1").with_title("RCT of type 2 diabetes treatment"),
            StudyRecord::new("2").with_title("A cooking article"),
        ];
        let criteria =
            ReviewCriteria::for_disease("type 2 diabetes", "randomized controlled trial");
        cascade.run(&records, &criteria).await
    }

    #[tokio::test]
    async fn explains_included_record_with_evidence() {
        let index = ExplanationIndex::from_run(&fixture_run().await);

        let explanation = index.explain("1", DecisionLayer::Rules).unwrap();
        assert_eq!(explanation.reasoning, "Matches disease and trial criteria");
        assert!(explanation.evidence.contains(&"rct".to_string()));
    }

    #[tokio::test]
    async fn excluded_record_has_empty_evidence_sequence() {
        let index = ExplanationIndex::from_run(&fixture_run().await);

        let explanation = index.explain("2", DecisionLayer::Rules).unwrap();
        assert!(explanation.evidence.is_empty());
    }

    #[tokio::test]
    async fn unknown_record_is_not_found() {
        let index = ExplanationIndex::from_run(&fixture_run().await);

        assert_eq!(
            index.explain("99", DecisionLayer::Rules).unwrap_err(),
            ExplainError::NotFound("99".to_string())
        );
    }

    #[tokio::test]
    async fn wrong_layer_is_a_mismatch_not_a_crash() {
        let index = ExplanationIndex::from_run(&fixture_run().await);

        let err = index.explain("1", DecisionLayer::Ml).unwrap_err();
        assert!(matches!(err, ExplainError::LayerMismatch { .. }));
    }
}
