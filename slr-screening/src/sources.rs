//! Record Source Boundary
//!
//! Capability trait for the external bibliographic search collaborator.
//! The cascade treats source output as already-parsed records and is
//! agnostic to the batching, pagination, and rate limiting the
//! collaborator performs; no network client lives in this crate.

use async_trait::async_trait;
use thiserror::Error;

use crate::contracts::{SearchResult, StudyRecord};

/// Errors from a record source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The underlying search request failed.
    #[error("search failed: {0}")]
    Search(String),
}

/// A bibliographic record source (e.g. a PubMed client).
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Search for records matching `query`, retrieving at most
    /// `max_results` of them. `total_count` reports the full match
    /// count even when fewer records are returned.
    async fn search(&self, query: &str, max_results: usize)
        -> Result<SearchResult, SourceError>;
}

/// An in-memory source serving a fixed record set, for tests and
/// fixtures. The query is ignored.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    records: Vec<StudyRecord>,
}

impl StaticRecordSource {
    /// A source serving exactly `records`.
    pub fn new(records: Vec<StudyRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl RecordSource for StaticRecordSource {
    async fn search(
        &self,
        _query: &str,
        max_results: usize,
    ) -> Result<SearchResult, SourceError> {
        Ok(SearchResult {
            total_count: self.records.len() as u64,
            records: self.records.iter().take(max_results).cloned().collect(),
        })
    }
}
