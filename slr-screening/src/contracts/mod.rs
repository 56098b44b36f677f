//! Contract Types
//!
//! Value types exchanged between the screening cascade and its
//! collaborators: study records, review criteria, screening decisions,
//! PRISMA metrics, and decision explanations.

pub mod decision;
pub mod explanation;
pub mod metrics;
pub mod record;

pub use decision::{DecisionLayer, PrismaStage, ScreeningDecision, Verdict};
pub use explanation::Explanation;
pub use metrics::{MetricsMode, ScreeningMetrics};
pub use record::{ReviewCriteria, SearchResult, StudyRecord};
