//! Result types for queries and ingestion runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::StoredRecord;

/// A stored record with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// The matched record
    pub record: StoredRecord,
    /// Similarity score (higher is more similar; metric chosen by the store)
    pub similarity: f32,
}

/// Ranked similarity-search result, best match first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Matches in descending similarity order
    pub matches: Vec<ScoredRecord>,
}

impl QueryResult {
    /// Rank matches by descending similarity and keep the best `k`
    pub fn ranked(mut matches: Vec<ScoredRecord>, k: usize) -> Self {
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(k);
        Self { matches }
    }

    /// Number of matches
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether there are no matches
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Best match, if any
    pub fn top(&self) -> Option<&ScoredRecord> {
        self.matches.first()
    }

    /// Iterate over matches in rank order
    pub fn iter(&self) -> impl Iterator<Item = &ScoredRecord> {
        self.matches.iter()
    }
}

/// Answer from the retrieval-QA chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Generated answer text
    pub text: String,
    /// Context chunks supplied to the LLM, in rank order
    pub sources: Vec<ScoredRecord>,
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
    /// Number of configured sources
    pub sources: usize,
    /// Number of files downloaded from URLs
    pub downloaded: usize,
    /// Documents (pages) extracted
    pub documents: usize,
    /// Chunks produced by the splitter
    pub chunks: usize,
    /// Records written to the vector store
    pub stored: usize,
    /// Sources that contributed no documents
    pub empty_sources: Vec<String>,
}
