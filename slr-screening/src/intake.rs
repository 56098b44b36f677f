//! Criteria Intake State Machine
//!
//! The conversational intake flow modeled as an explicit finite-state
//! machine: a closed set of states and a transition table keyed by
//! structured intents. Routing never depends on substring matching over
//! free text; the layer that parses user utterances into intents lives
//! outside this crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Conversation states for criteria intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeState {
    /// No review in progress.
    #[default]
    Idle,
    /// Collecting criteria fields from the user.
    CriteriaIntake,
    /// Checking the collected criteria for completeness.
    Validating,
    /// A screening job is running.
    Executing,
    /// The job finished and results are available.
    Completed,
    /// The job failed; only a reset leaves this state.
    Error,
}

/// Structured intents driving intake transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeIntent {
    /// User wants to start a review.
    BeginReview,
    /// User supplied one or more criteria fields.
    ProvideCriteria,
    /// User confirmed the collected criteria.
    ConfirmCriteria,
    /// Criteria validation succeeded.
    ValidationPassed,
    /// Criteria validation found gaps; intake resumes.
    ValidationFailed,
    /// The screening job finished successfully.
    JobCompleted,
    /// The screening job failed.
    JobFailed,
    /// Abandon the session and start over.
    Reset,
}

/// Transition error for (state, intent) pairs outside the table.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("intent {intent:?} is not valid in state {state:?}")]
pub struct InvalidTransition {
    /// State the machine was in when the intent arrived.
    pub state: IntakeState,
    /// The rejected intent.
    pub intent: IntakeIntent,
}

/// The intake machine. Holds only the current state; criteria
/// accumulation belongs to the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeMachine {
    state: IntakeState,
}

impl IntakeMachine {
    /// A machine in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> IntakeState {
        self.state
    }

    /// Apply an intent, advancing the machine or reporting an invalid
    /// transition. The transition table is exhaustive over both enums.
    pub fn apply(&mut self, intent: IntakeIntent) -> Result<IntakeState, InvalidTransition> {
        use IntakeIntent as I;
        use IntakeState as S;

        let next = match (self.state, intent) {
            // Reset is accepted from every state.
            (_, I::Reset) => S::Idle,

            (S::Idle, I::BeginReview) => S::CriteriaIntake,
            (S::CriteriaIntake, I::ProvideCriteria) => S::CriteriaIntake,
            (S::CriteriaIntake, I::ConfirmCriteria) => S::Validating,
            (S::Validating, I::ValidationPassed) => S::Executing,
            (S::Validating, I::ValidationFailed) => S::CriteriaIntake,
            (S::Executing, I::JobCompleted) => S::Completed,
            (S::Executing, I::JobFailed) => S::Error,

            (state, intent) => return Err(InvalidTransition { state, intent }),
        };

        debug!(from = ?self.state, ?intent, to = ?next, "intake transition");
        self.state = next;
        Ok(next)
    }
}
