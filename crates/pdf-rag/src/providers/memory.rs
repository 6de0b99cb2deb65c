//! In-process vector store with exact cosine search

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{QueryResult, ScoredRecord, StoredRecord};

use super::vector_store::VectorStoreProvider;

/// Vector store held in memory; contents are lost when the process exits
#[derive(Default)]
pub struct MemoryVectorStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryVectorStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize> {
        let mut stored = self.records.write();
        let expected = stored
            .first()
            .map(|r| r.embedding.len())
            .or_else(|| records.first().map(|r| r.embedding.len()));

        // Validate the whole batch before touching the store
        for (i, record) in records.iter().enumerate() {
            if record.embedding.is_empty() {
                return Err(Error::vector_db(format!("record {} has no embedding", i)));
            }
            if Some(record.embedding.len()) != expected {
                return Err(Error::vector_db(format!(
                    "record {} has dimension {}, expected {}",
                    i,
                    record.embedding.len(),
                    expected.unwrap_or_default()
                )));
            }
        }

        for record in records {
            let mut record = record.clone();
            let id = record
                .id
                .get_or_insert_with(|| Uuid::new_v4().to_string())
                .clone();

            match stored.iter_mut().find(|r| r.id.as_deref() == Some(id.as_str())) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(records.len())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        let stored = self.records.read();

        let matches = stored
            .iter()
            .map(|record| {
                if record.embedding.len() != embedding.len() {
                    return Err(Error::vector_db(format!(
                        "query has dimension {}, store holds {}",
                        embedding.len(),
                        record.embedding.len()
                    )));
                }
                Ok(ScoredRecord {
                    record: StoredRecord {
                        embedding: Vec::new(),
                        ..record.clone()
                    },
                    similarity: cosine_similarity(embedding, &record.embedding),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryResult::ranked(matches, k).matches)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Cosine similarity; zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    fn record(id: Option<&str>, content: &str, embedding: Vec<f32>) -> StoredRecord {
        StoredRecord {
            id: id.map(str::to_string),
            content: content.to_string(),
            metadata: Metadata::new(),
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&[
                record(None, "east", vec![1.0, 0.0]),
                record(None, "north", vec![0.0, 1.0]),
                record(None, "north-east", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[0.0, 1.0], 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.content, "north");
        assert_eq!(results[1].record.content, "north-east");
        assert!(results[0].record.embedding.is_empty());
        assert!(results[0].record.id.is_some());
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryVectorStore::new();
        store
            .upsert(&[record(Some("a"), "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(&[record(Some("a"), "new", vec![1.0, 0.0])])
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let results = store.search(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(results[0].record.content, "new");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryVectorStore::new();
        let err = store
            .upsert(&[
                record(None, "a", vec![1.0, 0.0]),
                record(None, "b", vec![1.0, 0.0, 0.0]),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::VectorDb(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_matches() {
        let store = MemoryVectorStore::new();
        assert!(store.search(&[1.0, 0.0], 3).await.unwrap().is_empty());
    }
}
