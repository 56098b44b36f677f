//! Rule Gate
//!
//! The deterministic first-pass screener. A rule gate is an ordered
//! list of named gates; each gate is a pass/fail predicate over the
//! record text and the review criteria, with its own exclusion
//! confidence and reasoning. Evaluation stops at the first failing
//! gate.
//!
//! `evaluate` is a pure function: no side effects, and identical
//! (record, criteria) inputs always produce bit-identical decisions.
//! Determinism is required for auditability.

use tracing::debug;

use crate::contracts::{
    DecisionLayer, PrismaStage, ReviewCriteria, ScreeningDecision, StudyRecord, Verdict,
};
use crate::screening::taxonomy::{ConfigError, KeywordTaxonomy};

/// Confidence attached to an include decision when every gate passes.
pub const INCLUSION_CONFIDENCE: f64 = 0.90;

/// Outcome of a single gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The record passes this gate; `evidence` holds the matched
    /// keyword spans supporting the pass.
    Pass { evidence: Vec<String> },
    /// The record fails this gate and is excluded.
    Fail,
}

/// A pass/fail predicate over (screening text, criteria).
///
/// Implementations must be deterministic and side-effect free.
pub trait GateCheck: Send + Sync {
    /// Evaluate the lowercased screening text against the criteria.
    fn evaluate(&self, text: &str, criteria: &ReviewCriteria) -> GateOutcome;
}

/// A named gate: a check plus the confidence and reasoning emitted when
/// the check fails.
pub struct Gate {
    name: String,
    exclusion_confidence: f64,
    exclusion_reasoning: String,
    check: Box<dyn GateCheck>,
}

impl Gate {
    /// A gate from its check and exclusion parameters.
    pub fn new(
        name: impl Into<String>,
        exclusion_confidence: f64,
        exclusion_reasoning: impl Into<String>,
        check: impl GateCheck + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            exclusion_confidence,
            exclusion_reasoning: exclusion_reasoning.into(),
            check: Box::new(check),
        }
    }

    /// Gate name, unique within a rule gate.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gate")
            .field("name", &self.name)
            .field("exclusion_confidence", &self.exclusion_confidence)
            .finish_non_exhaustive()
    }
}

/// Disease-match check: passes when any synonym of the group matching
/// `criteria.disease` (or of any group, when the disease is unset or
/// unknown) appears in the text.
pub struct DiseaseMatch {
    taxonomy: KeywordTaxonomy,
}

impl DiseaseMatch {
    /// A disease check over the given taxonomy.
    pub fn new(taxonomy: KeywordTaxonomy) -> Self {
        Self { taxonomy }
    }
}

impl GateCheck for DiseaseMatch {
    fn evaluate(&self, text: &str, criteria: &ReviewCriteria) -> GateOutcome {
        let evidence = self.taxonomy.matches(criteria.disease.as_deref(), text);
        if evidence.is_empty() {
            GateOutcome::Fail
        } else {
            GateOutcome::Pass { evidence }
        }
    }
}

/// Study-type check: passes when any synonym of the trial-type taxonomy
/// appears in the text.
pub struct StudyTypeMatch {
    taxonomy: KeywordTaxonomy,
}

impl StudyTypeMatch {
    /// A study-type check over the given taxonomy.
    pub fn new(taxonomy: KeywordTaxonomy) -> Self {
        Self { taxonomy }
    }
}

impl GateCheck for StudyTypeMatch {
    fn evaluate(&self, text: &str, _criteria: &ReviewCriteria) -> GateOutcome {
        let evidence = self.taxonomy.matches_any(text);
        if evidence.is_empty() {
            GateOutcome::Fail
        } else {
            GateOutcome::Pass { evidence }
        }
    }
}

/// A rule-gate decision together with the keyword spans that supported
/// it. Evidence feeds the explanation index.
#[derive(Debug, Clone, PartialEq)]
pub struct GateDecision {
    /// The decision itself.
    pub decision: ScreeningDecision,
    /// Matched keyword spans; empty for exclusions.
    pub evidence: Vec<String>,
}

/// The ordered rule gate.
pub struct RuleGate {
    gates: Vec<Gate>,
}

impl RuleGate {
    /// Build a rule gate from an ordered gate list.
    ///
    /// Fails fast on an empty list, duplicate gate names, or exclusion
    /// confidences outside [0, 1].
    pub fn new(gates: Vec<Gate>) -> Result<Self, ConfigError> {
        if gates.is_empty() {
            return Err(ConfigError::NoGates);
        }
        let mut seen = std::collections::BTreeSet::new();
        for gate in &gates {
            if !seen.insert(gate.name.clone()) {
                return Err(ConfigError::DuplicateGate(gate.name.clone()));
            }
            if !(0.0..=1.0).contains(&gate.exclusion_confidence) {
                return Err(ConfigError::ConfidenceOutOfRange {
                    name: gate.name.clone(),
                    confidence: gate.exclusion_confidence,
                });
            }
        }
        Ok(Self { gates })
    }

    /// The shipped configuration: disease match (0.95) then study-type
    /// match (0.92), over the default taxonomies.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::with_taxonomies(
            KeywordTaxonomy::default_diseases(),
            KeywordTaxonomy::default_trial_types(),
        )
    }

    /// The shipped gate order over caller-supplied taxonomies.
    pub fn with_taxonomies(
        diseases: KeywordTaxonomy,
        trial_types: KeywordTaxonomy,
    ) -> Result<Self, ConfigError> {
        Self::new(vec![
            Gate::new(
                "disease-match",
                0.95,
                "Does not match disease criteria",
                DiseaseMatch::new(diseases),
            ),
            Gate::new(
                "study-type-match",
                0.92,
                "Not a clinical trial",
                StudyTypeMatch::new(trial_types),
            ),
        ])
    }

    /// Evaluate a record against the criteria.
    ///
    /// Pure and deterministic: the first failing gate emits an exclude
    /// decision at `prisma_stage = screening` with that gate's
    /// confidence and reasoning; when all gates pass, the record is
    /// included at `prisma_stage = inclusion` with confidence 0.90 and
    /// the accumulated keyword evidence of every gate.
    pub fn evaluate(&self, record: &StudyRecord, criteria: &ReviewCriteria) -> GateDecision {
        let text = record.screening_text();
        let mut evidence = Vec::new();

        for gate in &self.gates {
            match gate.check.evaluate(&text, criteria) {
                GateOutcome::Pass { evidence: matched } => {
                    evidence.extend(matched);
                }
                GateOutcome::Fail => {
                    debug!(record_id = %record.id, gate = %gate.name, "record excluded at rule gate");
                    return GateDecision {
                        decision: ScreeningDecision {
                            record_id: record.id.clone(),
                            verdict: Verdict::Exclude,
                            confidence: gate.exclusion_confidence,
                            layer: DecisionLayer::Rules,
                            reasoning: gate.exclusion_reasoning.clone(),
                            prisma_stage: PrismaStage::Screening,
                        },
                        evidence: Vec::new(),
                    };
                }
            }
        }

        GateDecision {
            decision: ScreeningDecision {
                record_id: record.id.clone(),
                verdict: Verdict::Include,
                confidence: INCLUSION_CONFIDENCE,
                layer: DecisionLayer::Rules,
                reasoning: "Matches disease and trial criteria".to_string(),
                prisma_stage: PrismaStage::Inclusion,
            },
            evidence,
        }
    }

    /// Names of the configured gates, in evaluation order.
    pub fn gate_names(&self) -> Vec<&str> {
        self.gates.iter().map(|g| g.name.as_str()).collect()
    }
}

impl std::fmt::Debug for RuleGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleGate").field("gates", &self.gates).finish()
    }
}
