//! SLR Screening Cascade
//!
//! This crate screens bibliographic study records against
//! systematic-literature-review (SLR) inclusion/exclusion criteria,
//! producing an auditable per-record decision and aggregate accuracy
//! metrics compatible with PRISMA reporting conventions.
//!
//! # Architecture
//!
//! The core is a multi-layer screening cascade:
//!
//! 1. A deterministic, rule-based gate over configurable keyword
//!    taxonomies — pure, auditable, and always first.
//! 2. Zero or more scorer plugins (statistical classifier, semantic
//!    similarity, human review), each seeing only records the earlier
//!    layers did not exclude.
//!
//! Exclusion is terminal within a pass; each decision records the last
//! layer that actually executed. Scorer failures are recovered locally:
//! the batch continues with the prior layer's decision, and the
//! fallback is observable through the decision's `layer` field.
//!
//! # Usage
//!
//! ```rust,ignore
//! use slr_screening::contracts::ReviewCriteria;
//! use slr_screening::screening::{RuleGate, ScreeningCascade};
//! use slr_screening::{explain::ExplanationIndex, metrics};
//!
//! let cascade = ScreeningCascade::new(RuleGate::with_defaults()?);
//! let run = cascade.run(&records, &criteria).await;
//!
//! let metrics = metrics::aggregate(&run.decisions);
//! let explanations = ExplanationIndex::from_run(&run);
//! ```
//!
//! # Modules
//!
//! - [`contracts`]: record, criteria, decision, metrics, and
//!   explanation value types
//! - [`screening`]: taxonomies, the rule gate, scorer plugins, and the
//!   cascade orchestrator
//! - [`metrics`]: the whole-batch metrics aggregator
//! - [`explain`]: the per-pass explanation index
//! - [`session`]: job/session store with UUID job ids
//! - [`intake`]: the criteria-intake finite-state machine
//! - [`sources`]: the record-source collaborator boundary

#![warn(missing_docs)]

pub mod contracts;
pub mod explain;
pub mod intake;
pub mod metrics;
pub mod screening;
pub mod session;
pub mod sources;

pub use contracts::{
    DecisionLayer, Explanation, MetricsMode, PrismaStage, ReviewCriteria, ScreeningDecision,
    ScreeningMetrics, SearchResult, StudyRecord, Verdict,
};
pub use explain::{ExplainError, ExplanationIndex};
pub use screening::{
    CancelFlag, CascadeConfig, ConfigError, RuleGate, Scorer, ScorerError, ScreeningCascade,
    ScreeningRun,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
