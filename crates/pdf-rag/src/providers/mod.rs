//! Provider abstractions for embeddings, LLM and vector storage
//!
//! The pipelines only talk to these traits, so hosted backends (OpenAI,
//! Supabase) and local ones (Ollama, in-memory) are interchangeable.

pub mod embedding;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod openai;
pub mod supabase;
pub mod vector_store;

use std::sync::Arc;

use crate::config::{EmbeddingConfig, LlmConfig, ProviderKind, VectorStoreConfig, VectorStoreKind};
use crate::error::Result;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use memory::MemoryVectorStore;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use openai::{OpenAiEmbedder, OpenAiLlm};
pub use supabase::SupabaseVectorStore;
pub use vector_store::VectorStoreProvider;

/// Build the configured embedding provider
pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiEmbedder::new(config)?),
        ProviderKind::Ollama => Arc::new(OllamaEmbedder::new(config)?),
    };
    tracing::info!(provider = embedder.name(), model = %config.model, "Embedding provider ready");
    Ok(embedder)
}

/// Build the configured LLM provider
pub fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    let llm: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiLlm::new(config)?),
        ProviderKind::Ollama => Arc::new(OllamaLlm::new(config)?),
    };
    tracing::info!(provider = llm.name(), model = llm.model(), "LLM provider ready");
    Ok(llm)
}

/// Build the configured vector store
pub fn build_vector_store(config: &VectorStoreConfig) -> Result<Arc<dyn VectorStoreProvider>> {
    let store: Arc<dyn VectorStoreProvider> = match config.provider {
        VectorStoreKind::Supabase => Arc::new(SupabaseVectorStore::new(config)?),
        VectorStoreKind::Memory => {
            tracing::warn!("Using in-memory vector store; records are not persisted");
            Arc::new(MemoryVectorStore::new())
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_select_backends() {
        let embeddings = EmbeddingConfig {
            provider: ProviderKind::Ollama,
            ..EmbeddingConfig::default()
        };
        assert_eq!(build_embedder(&embeddings).unwrap().name(), "ollama");

        let llm = LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(build_llm(&llm).unwrap().name(), "openai");

        let store = VectorStoreConfig {
            provider: VectorStoreKind::Memory,
            ..VectorStoreConfig::default()
        };
        assert_eq!(build_vector_store(&store).unwrap().name(), "memory");
    }

    #[test]
    fn test_factories_surface_config_errors() {
        assert!(build_embedder(&EmbeddingConfig::default()).is_err());
        assert!(build_vector_store(&VectorStoreConfig::default()).is_err());
    }
}
