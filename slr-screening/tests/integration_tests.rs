//! End-to-end tests for the screening cascade.
//!
//! Each scenario drives the public API the way a calling service would:
//! build a cascade, screen a batch, aggregate metrics, and look up
//! explanations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use slr_screening::contracts::{
    DecisionLayer, MetricsMode, PrismaStage, ReviewCriteria, ScreeningDecision, StudyRecord,
    Verdict,
};
use slr_screening::explain::ExplanationIndex;
use slr_screening::metrics;
use slr_screening::screening::{RuleGate, Scorer, ScorerError, ScreeningCascade};
use slr_screening::session::{JobStatus, SessionStore};

fn fixture_records() -> Vec<StudyRecord> {
    vec![
        StudyRecord::new("1").with_title("RCT of type 2 diabetes treatment"),
        StudyRecord::new("2").with_title("A cooking article"),
    ]
}

fn fixture_criteria() -> ReviewCriteria {
    ReviewCriteria::for_disease("type 2 diabetes", "randomized controlled trial")
}

/// A scorer that raises the confidence of every inclusion it sees.
struct MlBoost;

#[async_trait]
impl Scorer for MlBoost {
    fn name(&self) -> &str {
        "ml-boost"
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
            confidence: 0.92,
            layer: DecisionLayer::Ml,
            reasoning: "Classifier agrees with inclusion".to_string(),
            ..prior.clone()
        })
    }
}

/// A scorer whose backend is always down.
struct BrokenScorer;

#[async_trait]
impl Scorer for BrokenScorer {
    fn name(&self) -> &str {
        "broken"
    }

    fn layer(&self) -> DecisionLayer {
        DecisionLayer::Ml
    }

    async fn score(
        &self,
        _record: &StudyRecord,
        _prior: &ScreeningDecision,
    ) -> Result<ScreeningDecision, ScorerError> {
        Err(ScorerError::failed("broken", "backend offline"))
    }
}

mod rules_only {
    use super::*;

    #[tokio::test]
    async fn matching_and_nonmatching_records_split_as_expected() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;

        assert_eq!(run.decisions.len(), 2);
        assert!(run.pending.is_empty());

        let first = &run.decisions[0];
        assert_eq!(first.record_id, "1");
        assert_eq!(first.verdict, Verdict::Include);
        assert_eq!(first.layer, DecisionLayer::Rules);
        assert_eq!(first.confidence, 0.90);
        assert_eq!(first.prisma_stage, PrismaStage::Inclusion);

        let second = &run.decisions[1];
        assert_eq!(second.record_id, "2");
        assert_eq!(second.verdict, Verdict::Exclude);
        assert_eq!(second.layer, DecisionLayer::Rules);
        assert_eq!(second.confidence, 0.95);
        assert_eq!(second.reasoning, "Does not match disease criteria");
        assert_eq!(second.prisma_stage, PrismaStage::Screening);
    }

    #[tokio::test]
    async fn decisions_preserve_input_order() {
        let records: Vec<StudyRecord> = (0..20)
            .map(|i| {
                let record = StudyRecord::new(format!("r{i}"));
                if i % 2 == 0 {
                    record.with_title("Randomized t2dm trial")
                } else {
                    record.with_title("Unrelated editorial")
                }
            })
            .collect();

        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&records, &fixture_criteria()).await;

        let ids: Vec<&str> = run.decisions.iter().map(|d| d.record_id.as_str()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("r{i}")).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn repeated_runs_are_bit_identical() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());

        let first = cascade.run(&fixture_records(), &fixture_criteria()).await;
        let second = cascade.run(&fixture_records(), &fixture_criteria()).await;

        assert_eq!(first.decisions, second.decisions);
        assert_eq!(first.criteria_hash, second.criteria_hash);
    }
}

mod with_scorers {
    use super::*;

    #[tokio::test]
    async fn ml_scorer_retags_inclusions_and_skips_exclusions() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_scorer(Arc::new(MlBoost));

        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;

        let first = &run.decisions[0];
        assert_eq!(first.verdict, Verdict::Include);
        assert_eq!(first.layer, DecisionLayer::Ml);
        assert_eq!(first.confidence, 0.92);

        // The excluded record never reached the scorer.
        let second = &run.decisions[1];
        assert_eq!(second.layer, DecisionLayer::Rules);
        assert_eq!(second.confidence, 0.95);
    }

    #[tokio::test]
    async fn broken_scorer_degrades_to_rules_only_output() {
        let with_broken = ScreeningCascade::new(RuleGate::with_defaults().unwrap())
            .with_scorer(Arc::new(BrokenScorer));
        let rules_only = ScreeningCascade::new(RuleGate::with_defaults().unwrap());

        let degraded = with_broken.run(&fixture_records(), &fixture_criteria()).await;
        let baseline = rules_only.run(&fixture_records(), &fixture_criteria()).await;

        assert_eq!(degraded.decisions, baseline.decisions);
        assert!(degraded.decisions.iter().all(|d| d.layer == DecisionLayer::Rules));
    }
}

mod metrics_and_explanations {
    use super::*;

    #[tokio::test]
    async fn estimated_metrics_match_the_decision_set() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;

        let metrics = metrics::aggregate(&run.decisions);
        assert_eq!(metrics.mode, MetricsMode::Estimated);
        assert_eq!(metrics.total_screened, 2);
        assert_eq!(metrics.total_included, 1);
        assert_eq!(metrics.total_excluded, 1);
        assert_eq!(
            metrics.total_included + metrics.total_excluded,
            metrics.total_screened
        );
        for rate in [metrics.precision, metrics.recall, metrics.f1, metrics.accuracy] {
            assert!((0.0..=1.0).contains(&rate));
        }
    }

    #[tokio::test]
    async fn ground_truth_metrics_score_a_perfect_pass() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;

        let labels = HashMap::from([
            ("1".to_string(), Verdict::Include),
            ("2".to_string(), Verdict::Exclude),
        ]);
        let metrics = metrics::aggregate_with_labels(&run.decisions, &labels);

        assert_eq!(metrics.mode, MetricsMode::GroundTruth);
        assert_eq!(metrics.true_positives, 1);
        assert_eq!(metrics.true_negatives, 1);
        assert_eq!(metrics.false_positives, 0);
        assert_eq!(metrics.false_negatives, 0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[tokio::test]
    async fn explanations_carry_matched_keywords() {
        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;

        let index = ExplanationIndex::from_run(&run);
        assert_eq!(index.len(), 2);

        let included = index.explain("1", DecisionLayer::Rules).unwrap();
        assert_eq!(included.verdict, Verdict::Include);
        assert!(included.evidence.contains(&"type 2 diabetes".to_string()));
        assert!(included.evidence.contains(&"rct".to_string()));

        let excluded = index.explain("2", DecisionLayer::Rules).unwrap();
        assert_eq!(excluded.verdict, Verdict::Exclude);
        assert!(excluded.evidence.is_empty());
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn full_job_lifecycle_through_the_session_store() {
        let mut store = SessionStore::new();
        let job_id = store.create(fixture_criteria());

        let cascade = ScreeningCascade::new(RuleGate::with_defaults().unwrap());
        let run = cascade.run(&fixture_records(), &fixture_criteria()).await;
        let metrics = metrics::aggregate(&run.decisions);

        store.complete(job_id, run.decisions, metrics).unwrap();

        let job = store.get(job_id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.decisions.len(), 2);
        assert_eq!(job.metrics.as_ref().unwrap().total_included, 1);
    }
}
