//! Scorer Plugins
//!
//! Optional refinement layers behind the rule gate. A scorer sees only
//! records the earlier layers did not exclude, and returns a new
//! decision tagged with its own layer. Scorers may perform blocking or
//! out-of-process work; the cascade bounds every call with a timeout
//! and treats failures as no-ops (the prior layer's decision stands).

use async_trait::async_trait;
use thiserror::Error;

use crate::contracts::{DecisionLayer, ScreeningDecision, StudyRecord};

/// Errors a scorer may raise. All variants are recovered locally by the
/// cascade; none abort a batch.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The scorer ran and failed.
    #[error("scorer '{scorer}' failed: {message}")]
    Failed {
        /// Scorer name.
        scorer: String,
        /// Failure detail.
        message: String,
    },

    /// The scorer's backend could not be reached.
    #[error("scorer '{scorer}' backend unavailable: {message}")]
    Unavailable {
        /// Scorer name.
        scorer: String,
        /// Unavailability detail.
        message: String,
    },
}

impl ScorerError {
    /// A [`ScorerError::Failed`] from its parts.
    pub fn failed(scorer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            scorer: scorer.into(),
            message: message.into(),
        }
    }
}

/// A pluggable scoring layer.
///
/// Implementations are polymorphic over the ML, semantic, and human
/// layers. `score` receives the prior layer's decision and returns a
/// replacement (possibly identical) decision which must:
///
/// - keep the prior `record_id`,
/// - be tagged with this scorer's [`layer`](Scorer::layer),
/// - carry a confidence in [0, 1],
/// - never flip an exclusion back to an inclusion.
///
/// Decisions violating these rules are discarded by the cascade and
/// logged as scoring failures.
#[async_trait]
pub trait Scorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Layer this scorer's decisions are tagged with.
    fn layer(&self) -> DecisionLayer;

    /// Re-score a record given the prior layer's decision.
    async fn score(
        &self,
        record: &StudyRecord,
        prior: &ScreeningDecision,
    ) -> Result<ScreeningDecision, ScorerError>;
}
