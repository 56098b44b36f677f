//! Job Sessions
//!
//! An explicit session store keyed by job id, with a defined
//! create/complete/reset/destroy lifecycle. Job ids are UUID v4:
//! collision-resistant across concurrent jobs even when criteria are
//! identical.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::contracts::{ReviewCriteria, ScreeningDecision, ScreeningMetrics};

/// Lifecycle state of a screening job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// The pass is still executing.
    Running,
    /// The pass finished and results are stored.
    Completed,
    /// The pass aborted on an error.
    Failed,
    /// The pass was cancelled before completion.
    Cancelled,
}

/// A single screening job and its results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningJob {
    /// Randomly assigned job identifier.
    pub job_id: Uuid,
    /// Criteria the job screens against.
    pub criteria: ReviewCriteria,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// Decisions produced so far; empty until completion.
    pub decisions: Vec<ScreeningDecision>,
    /// Aggregate metrics, set on completion.
    pub metrics: Option<ScreeningMetrics>,
}

/// Session store errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No job with the given id exists in the store.
    #[error("unknown job '{0}'")]
    UnknownJob(Uuid),
}

/// In-memory store of screening jobs.
///
/// Callers needing shared access wrap the store in their own
/// synchronization; the store itself holds no global state.
#[derive(Debug, Default)]
pub struct SessionStore {
    jobs: HashMap<Uuid, ScreeningJob>,
}

impl SessionStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a job for the given criteria and return its id.
    pub fn create(&mut self, criteria: ReviewCriteria) -> Uuid {
        let job_id = Uuid::new_v4();
        info!(%job_id, "screening job created");
        self.jobs.insert(
            job_id,
            ScreeningJob {
                job_id,
                criteria,
                status: JobStatus::Running,
                created_at: Utc::now(),
                decisions: Vec::new(),
                metrics: None,
            },
        );
        job_id
    }

    /// Look up a job by id.
    pub fn get(&self, job_id: Uuid) -> Result<&ScreeningJob, SessionError> {
        self.jobs
            .get(&job_id)
            .ok_or(SessionError::UnknownJob(job_id))
    }

    /// Record the results of a finished pass.
    pub fn complete(
        &mut self,
        job_id: Uuid,
        decisions: Vec<ScreeningDecision>,
        metrics: ScreeningMetrics,
    ) -> Result<(), SessionError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(SessionError::UnknownJob(job_id))?;
        job.decisions = decisions;
        job.metrics = Some(metrics);
        job.status = JobStatus::Completed;
        info!(%job_id, decisions = job.decisions.len(), "screening job completed");
        Ok(())
    }

    /// Mark a job as failed or cancelled.
    pub fn finish_with_status(
        &mut self,
        job_id: Uuid,
        status: JobStatus,
    ) -> Result<(), SessionError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(SessionError::UnknownJob(job_id))?;
        job.status = status;
        Ok(())
    }

    /// Clear a job's results and return it to the running state.
    pub fn reset(&mut self, job_id: Uuid) -> Result<(), SessionError> {
        let job = self
            .jobs
            .get_mut(&job_id)
            .ok_or(SessionError::UnknownJob(job_id))?;
        job.decisions.clear();
        job.metrics = None;
        job.status = JobStatus::Running;
        info!(%job_id, "screening job reset");
        Ok(())
    }

    /// Remove a job from the store entirely.
    pub fn destroy(&mut self, job_id: Uuid) -> Result<(), SessionError> {
        self.jobs
            .remove(&job_id)
            .map(|_| info!(%job_id, "screening job destroyed"))
            .ok_or(SessionError::UnknownJob(job_id))
    }

    /// Number of stored jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the store holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::MetricsMode;

    #[test]
    fn lifecycle_create_complete_reset_destroy() {
        let mut store = SessionStore::new();
        let job_id = store.create(ReviewCriteria::default());

        assert_eq!(store.get(job_id).unwrap().status, JobStatus::Running);

        store
            .complete(job_id, Vec::new(), ScreeningMetrics::empty(MetricsMode::Estimated))
            .unwrap();
        assert_eq!(store.get(job_id).unwrap().status, JobStatus::Completed);
        assert!(store.get(job_id).unwrap().metrics.is_some());

        store.reset(job_id).unwrap();
        assert_eq!(store.get(job_id).unwrap().status, JobStatus::Running);
        assert!(store.get(job_id).unwrap().metrics.is_none());

        store.destroy(job_id).unwrap();
        assert_eq!(store.get(job_id).unwrap_err(), SessionError::UnknownJob(job_id));
    }

    #[test]
    fn identical_criteria_yield_distinct_job_ids() {
        let mut store = SessionStore::new();
        let first = store.create(ReviewCriteria::default());
        let second = store.create(ReviewCriteria::default());
        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_job_operations_report_errors() {
        let mut store = SessionStore::new();
        let ghost = Uuid::new_v4();
        assert!(store.get(ghost).is_err());
        assert!(store.reset(ghost).is_err());
        assert!(store.destroy(ghost).is_err());
    }
}
