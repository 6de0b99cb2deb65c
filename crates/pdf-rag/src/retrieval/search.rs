//! Query embedding and nearest-neighbour lookup

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::QueryResult;

/// Finds the stored chunks closest to a query.
///
/// Must be built with the same embedding provider used at ingest time.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl Retriever {
    /// Create a retriever over `store`
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { embedder, store }
    }

    /// Return the `k` most similar records, best first
    pub async fn similarity_search(&self, query: &str, k: usize) -> Result<QueryResult> {
        if k == 0 {
            return Err(Error::config("k must be at least 1"));
        }

        let embedding = self.embedder.embed(query).await?;
        let matches = self.store.search(&embedding, k).await.map_err(|e| {
            Error::retrieval(format!("{} search failed: {}", self.store.name(), e))
        })?;
        let result = QueryResult::ranked(matches, k);

        if result.is_empty() {
            return Err(Error::retrieval(format!(
                "no matching records in {} store",
                self.store.name()
            )));
        }

        tracing::info!(
            "Retrieved {} records (top similarity {:.4})",
            result.len(),
            result.top().map(|m| m.similarity).unwrap_or_default()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MemoryVectorStore;
    use crate::test_support::KeywordEmbedder;
    use crate::types::{Chunk, Document, ScoredRecord, StoredRecord};
    use async_trait::async_trait;

    /// Store whose backend cannot be reached
    struct UnreachableStore;

    #[async_trait]
    impl VectorStoreProvider for UnreachableStore {
        async fn upsert(&self, _records: &[StoredRecord]) -> Result<usize> {
            Err(Error::vector_db("connection refused"))
        }

        async fn search(&self, _embedding: &[f32], _k: usize) -> Result<Vec<ScoredRecord>> {
            Err(Error::vector_db("connection refused"))
        }

        fn name(&self) -> &str {
            "unreachable"
        }
    }

    async fn seeded(texts: &[&str]) -> Retriever {
        let embedder = Arc::new(KeywordEmbedder::new(128));
        let store = Arc::new(MemoryVectorStore::new());

        let mut records = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let chunk = Chunk::from_parent(&Document::new(*text), text.to_string(), i, 0, text.len());
            let embedding = embedder.embed(text).await.unwrap();
            records.push(StoredRecord::from_chunk(chunk, embedding));
        }
        store.upsert(&records).await.unwrap();

        Retriever::new(embedder, store)
    }

    #[tokio::test]
    async fn test_self_retrieval_ranks_first() {
        let texts = [
            "Photosynthesis turns sunlight into chemical energy",
            "The stock market closed higher on Friday",
            "Volcanoes erupt when magma reaches the surface",
        ];
        let retriever = seeded(&texts).await;

        for text in texts {
            let result = retriever.similarity_search(text, 3).await.unwrap();
            let top = result.top().unwrap();
            assert_eq!(top.record.content, text);
            assert!(result.iter().all(|m| m.similarity <= top.similarity));
        }
    }

    #[tokio::test]
    async fn test_results_truncated_to_k() {
        let retriever = seeded(&["one apple", "two apples", "three apples", "four apples"]).await;

        let result = retriever.similarity_search("apples", 2).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_store_is_an_error() {
        let retriever = Retriever::new(
            Arc::new(KeywordEmbedder::new(16)),
            Arc::new(MemoryVectorStore::new()),
        );

        let err = retriever.similarity_search("anything", 4).await.unwrap_err();

        assert!(matches!(err, Error::Retrieval(_)));
    }

    #[tokio::test]
    async fn test_zero_k_rejected() {
        let retriever = seeded(&["text"]).await;
        let err = tokio_test::assert_err!(retriever.similarity_search("text", 0).await);

        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_retrieval_error() {
        let retriever = Retriever::new(Arc::new(KeywordEmbedder::new(16)), Arc::new(UnreachableStore));

        let err = retriever.similarity_search("anything", 4).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Retrieval(ref m) if m.contains("unreachable") && m.contains("connection refused")
        ));
    }
}
