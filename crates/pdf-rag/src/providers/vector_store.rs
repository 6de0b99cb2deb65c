//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ScoredRecord, StoredRecord};

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `SupabaseVectorStore`: Postgres + pgvector behind PostgREST
/// - `MemoryVectorStore`: in-process cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Write all records in one logical operation, returning how many were written.
    ///
    /// Whether re-running with the same records duplicates them is up to the
    /// backing store.
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize>;

    /// Return up to `k` records nearest to `embedding`, with similarity scores
    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredRecord>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
