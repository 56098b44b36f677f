//! Cascade Orchestrator
//!
//! Sequences the rule gate and zero-or-more scorer plugins per record.
//! The orchestrator guarantees:
//!
//! - exactly one decision per input record, in input order;
//! - exclusion is terminal: a record excluded at any layer never
//!   reaches a later layer;
//! - a scorer failure (error, timeout, or invalid returned decision)
//!   never aborts the batch — the prior layer's decision is retained
//!   and the fallback is observable through the decision's `layer`;
//! - cancellation leaves already-computed decisions available and
//!   reports unprocessed record ids as pending, never fabricating
//!   decisions for them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::contracts::{ReviewCriteria, ScreeningDecision, StudyRecord, Verdict};
use crate::screening::gate::RuleGate;
use crate::screening::scorer::Scorer;

/// Cooperative cancellation flag for an in-flight batch.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the batch.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone)]
pub struct CascadeConfig {
    /// Upper bound applied to every scorer call; an elapsed timeout is
    /// treated as a scoring failure.
    pub scorer_timeout: Duration,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            scorer_timeout: Duration::from_secs(30),
        }
    }
}

/// The complete output of one screening pass.
#[derive(Debug, Clone)]
pub struct ScreeningRun {
    /// One decision per screened record, in input order.
    pub decisions: Vec<ScreeningDecision>,

    /// Ids of records left unprocessed by a cancellation, in input
    /// order. Empty for a completed pass.
    pub pending: Vec<String>,

    /// Matched keyword spans per record id, feeding the explanation
    /// index.
    pub evidence: HashMap<String, Vec<String>>,

    /// SHA-256 of the criteria, for determinism auditing across runs.
    pub criteria_hash: String,

    /// When the pass finished.
    pub completed_at: DateTime<Utc>,

    /// Wall-clock duration of the pass.
    pub elapsed_ms: u64,
}

impl ScreeningRun {
    /// Whether the pass was cancelled before screening every record.
    pub fn is_partial(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// The multi-layer screening cascade.
pub struct ScreeningCascade {
    gate: RuleGate,
    scorers: Vec<Arc<dyn Scorer>>,
    config: CascadeConfig,
}

impl ScreeningCascade {
    /// A cascade with only the rule gate attached.
    pub fn new(gate: RuleGate) -> Self {
        Self {
            gate,
            scorers: Vec::new(),
            config: CascadeConfig::default(),
        }
    }

    /// Attach a scorer plugin. Scorers run in attachment order after
    /// the rule gate; conventionally ML first, then semantic.
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorers.push(scorer);
        self
    }

    /// Override the default configuration.
    pub fn with_config(mut self, config: CascadeConfig) -> Self {
        self.config = config;
        self
    }

    /// Screen a batch of records. Total over any input, including the
    /// empty batch.
    pub async fn run(&self, records: &[StudyRecord], criteria: &ReviewCriteria) -> ScreeningRun {
        self.run_with_cancel(records, criteria, &CancelFlag::new())
            .await
    }

    /// Screen a batch with cooperative cancellation. Records not yet
    /// processed when the flag is raised are reported in
    /// [`ScreeningRun::pending`].
    #[instrument(skip_all, fields(records = records.len(), scorers = self.scorers.len()))]
    pub async fn run_with_cancel(
        &self,
        records: &[StudyRecord],
        criteria: &ReviewCriteria,
        cancel: &CancelFlag,
    ) -> ScreeningRun {
        let started = Instant::now();
        let mut decisions = Vec::with_capacity(records.len());
        let mut pending = Vec::new();
        let mut evidence = HashMap::new();

        for record in records {
            if cancel.is_cancelled() {
                pending.push(record.id.clone());
                continue;
            }

            let (decision, spans) = self.screen_record(record, criteria).await;
            evidence.insert(record.id.clone(), spans);
            decisions.push(decision);
        }

        let included = decisions.iter().filter(|d| d.is_included()).count();
        info!(
            screened = decisions.len(),
            included,
            pending = pending.len(),
            "screening pass complete"
        );

        ScreeningRun {
            decisions,
            pending,
            evidence,
            criteria_hash: criteria_hash(criteria),
            completed_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }

    async fn screen_record(
        &self,
        record: &StudyRecord,
        criteria: &ReviewCriteria,
    ) -> (ScreeningDecision, Vec<String>) {
        let gated = self.gate.evaluate(record, criteria);
        let mut decision = gated.decision;

        for scorer in &self.scorers {
            // Exclusion is terminal; later layers never see the record.
            if decision.verdict == Verdict::Exclude {
                break;
            }

            match tokio::time::timeout(self.config.scorer_timeout, scorer.score(record, &decision))
                .await
            {
                Ok(Ok(scored)) => match validate_scored(scorer.as_ref(), &decision, scored) {
                    Ok(scored) => decision = scored,
                    Err(reason) => {
                        warn!(
                            record_id = %record.id,
                            scorer = scorer.name(),
                            reason,
                            "scorer returned an invalid decision, keeping prior layer's decision"
                        );
                    }
                },
                Ok(Err(err)) => {
                    warn!(
                        record_id = %record.id,
                        scorer = scorer.name(),
                        error = %err,
                        "scorer failed, keeping prior layer's decision"
                    );
                }
                Err(_) => {
                    warn!(
                        record_id = %record.id,
                        scorer = scorer.name(),
                        timeout_ms = self.config.scorer_timeout.as_millis() as u64,
                        "scorer timed out, keeping prior layer's decision"
                    );
                }
            }
        }

        (decision, gated.evidence)
    }
}

/// Reject scorer output that violates the decision invariants.
fn validate_scored(
    scorer: &dyn Scorer,
    prior: &ScreeningDecision,
    scored: ScreeningDecision,
) -> Result<ScreeningDecision, &'static str> {
    if scored.record_id != prior.record_id {
        return Err("record id does not match the scored record");
    }
    if scored.layer != scorer.layer() {
        return Err("decision is not tagged with the scorer's layer");
    }
    if !(0.0..=1.0).contains(&scored.confidence) {
        return Err("confidence outside [0, 1]");
    }
    if prior.verdict == Verdict::Exclude && scored.verdict == Verdict::Include {
        return Err("exclusion is terminal and cannot be flipped to include");
    }
    Ok(scored)
}

fn criteria_hash(criteria: &ReviewCriteria) -> String {
    let json = serde_json::to_string(criteria).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{DecisionLayer, PrismaStage};
    use crate::screening::scorer::ScorerError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct BoostScorer {
        layer: DecisionLayer,
        confidence: f64,
        calls: AtomicUsize,
    }

    impl BoostScorer {
        fn new(layer: DecisionLayer, confidence: f64) -> Self {
            Self {
                layer,
                confidence,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Scorer for BoostScorer {
        fn name(&self) -> &str {
            "boost"
        }

        fn layer(&self) -> DecisionLayer {
            self.layer
        }

        async fn score(
            &self,
            _record: &StudyRecord,
            prior: &ScreeningDecision,
        ) -> Result<ScreeningDecision, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ScreeningDecision {
                confidence: self.confidence,
                layer: self.layer,
                reasoning: "High likelihood of relevance".to_string(),
                ..prior.clone()
            })
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl Scorer for FailingScorer {
        fn name(&self) -> &str {
            "failing"
        }

        fn layer(&self) -> DecisionLayer {
            DecisionLayer::Ml
        }

        async fn score(
            &self,
            _record: &StudyRecord,
            _prior: &ScreeningDecision,
        ) -> Result<ScreeningDecision, ScorerError> {
            Err(ScorerError::failed("failing", "model backend offline"))
        }
    }

    struct SlowScorer;

    #[async_trait]
    impl Scorer for SlowScorer {
        fn name(&self) -> &str {
            "slow"
        }

        fn layer(&self) -> DecisionLayer {
            DecisionLayer::Semantic
        }

        async fn score(
            &self,
            _record: &StudyRecord,
            prior: &ScreeningDecision,
        ) -> Result<ScreeningDecision, ScorerError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(prior.clone())
        }
    }

    fn fixture_records() -> Vec<StudyRecord> {
        vec![
            StudyRecord::new("1").with_title("RCT of type 2 diabetes treatment"),
            StudyRecord::new("2").with_title("A cooking article"),
        ]
    }

    fn fixture_criteria() -> ReviewCriteria {
        ReviewCriteria::for_disease("type 2 diabetes", "randomized controlled trial")
    }

    #[tokio::test]
    async fn excluded_records_never_reach_scorers() {
        let scorer = Arc::new(BoostScorer::new(DecisionLayer::Ml, 0.92));
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_scorer(scorer.clone());

        let records = vec![StudyRecord::new("2").with_title("A cooking article")];
        let run = cascade.run(&records, &fixture_criteria()).await;

        assert_eq!(scorer.call_count(), 0);
        assert_eq!(run.decisions[0].layer, DecisionLayer::Rules);
    }

    #[tokio::test]
    async fn scorer_retags_included_records() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_scorer(Arc::new(BoostScorer::new(DecisionLayer::Ml, 0.92)));

        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;

        assert_eq!(run.decisions[0].layer, DecisionLayer::Ml);
        assert_eq!(run.decisions[0].confidence, 0.92);
        assert_eq!(run.decisions[1].layer, DecisionLayer::Rules);
        assert_eq!(run.decisions[1].confidence, 0.95);
    }

    #[tokio::test]
    async fn scorer_failure_retains_prior_decision() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_scorer(Arc::new(FailingScorer));

        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;
        let baseline = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .run(&fixture_records(), &fixture_criteria())
            .await;

        assert_eq!(run.decisions, baseline.decisions);
    }

    #[tokio::test]
    async fn scorer_timeout_retains_prior_decision() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_config(CascadeConfig {
                scorer_timeout: Duration::from_millis(10),
            })
            .with_scorer(Arc::new(SlowScorer));

        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;
        assert_eq!(run.decisions[0].layer, DecisionLayer::Rules);
        assert_eq!(run.decisions[0].confidence, 0.90);
    }

    #[tokio::test]
    async fn invalid_layer_tag_is_discarded() {
        // Scorer claims to be ML but tags its output as human.
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_scorer(Arc::new(MislabelledScorer));

        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;
        assert_eq!(run.decisions[0].layer, DecisionLayer::Rules);
    }

    struct MislabelledScorer;

    #[async_trait]
    impl Scorer for MislabelledScorer {
        fn name(&self) -> &str {
            "mislabelled"
        }

        fn layer(&self) -> DecisionLayer {
            DecisionLayer::Ml
        }

        async fn score(
            &self,
            _record: &StudyRecord,
            prior: &ScreeningDecision,
        ) -> Result<ScreeningDecision, ScorerError> {
            Ok(ScreeningDecision {
                layer: DecisionLayer::Human,
                ..prior.clone()
            })
        }
    }

    #[tokio::test]
    async fn empty_batch_yields_empty_run() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&[], &fixture_criteria()).await;

        assert!(run.decisions.is_empty());
        assert!(run.pending.is_empty());
        assert!(!run.is_partial());
    }

    #[tokio::test]
    async fn cancellation_reports_unprocessed_records_as_pending() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let cancel = CancelFlag::new();
        cancel.cancel();

        let run = cascade
            .run_with_cancel(&fixture_records(), &fixture_criteria(), &cancel)
            .await;

        assert!(run.decisions.is_empty());
        assert_eq!(run.pending, vec!["1".to_string(), "2".to_string()]);
        assert!(run.is_partial());
    }

    #[tokio::test]
    async fn criteria_hash_is_stable_across_runs() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let first = cascade.run(&[], &fixture_criteria()).await;
        let second = cascade.run(&[], &fixture_criteria()).await;

        assert_eq!(first.criteria_hash, second.criteria_hash);
        assert_eq!(first.criteria_hash.len(), 64);
    }

    #[test]
    fn decision_verdict_serializes_for_prisma_export() {
        let decision = ScreeningDecision {
            record_id: "1".to_string(),
            verdict: Verdict::Include,
            confidence: 0.90,
            layer: DecisionLayer::Rules,
            reasoning: "Matches disease and trial criteria".to_string(),
            prisma_stage: PrismaStage::Inclusion,
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["verdict"], "INCLUDE");
        assert_eq!(json["prisma_stage"], "inclusion");
    }
}
