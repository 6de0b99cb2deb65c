//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Embedding;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiEmbedder`: OpenAI-compatible `/embeddings` endpoint
/// - `OllamaEmbedder`: Local Ollama server (nomic-embed-text)
///
/// The same provider must be used at ingest and query time; vectors from
/// different models are not comparable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Generate embeddings for multiple texts, one vector per input in order
    ///
    /// Default implementation calls `embed` sequentially.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions (e.g., 1536 for text-embedding-ada-002)
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
