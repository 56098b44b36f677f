//! Screening Cascade
//!
//! The multi-layer screening pipeline: keyword taxonomies, the
//! deterministic rule gate, the scorer plugin capability, and the
//! cascade orchestrator.

pub mod cascade;
pub mod gate;
pub mod scorer;
pub mod taxonomy;

pub use cascade::{CancelFlag, CascadeConfig, ScreeningCascade, ScreeningRun};
pub use gate::{DiseaseMatch, Gate, GateCheck, GateDecision, GateOutcome, RuleGate, StudyTypeMatch};
pub use scorer::{Scorer, ScorerError};
pub use taxonomy::{ConfigError, KeywordTaxonomy};
