//! Configuration for the ingestion and query pipelines

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable naming the TOML configuration file
pub const CONFIG_PATH_ENV: &str = "PDF_RAG_CONFIG";

/// Configuration file used when `PDF_RAG_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "pdf-rag.toml";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// PDF locations to ingest (local paths or http(s) URLs)
    pub sources: Vec<String>,
    /// Directory downloaded PDFs are written to
    pub download_dir: PathBuf,
    /// Request timeout for PDF downloads; unset means no timeout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_timeout_secs: Option<u64>,
    /// Query script settings
    pub query: QueryConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// PDF extraction configuration
    pub extraction: ExtractionConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Vector database configuration
    pub vector_store: VectorStoreConfig,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            download_dir: PathBuf::from("./documents"),
            download_timeout_secs: None,
            query: QueryConfig::default(),
            chunking: ChunkingConfig::default(),
            extraction: ExtractionConfig::default(),
            embeddings: EmbeddingConfig::default(),
            llm: LlmConfig::default(),
            vector_store: VectorStoreConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load configuration from a TOML file; absent sections take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load the configuration file named by `PDF_RAG_CONFIG` (or
    /// `pdf-rag.toml` if present), then apply environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE)?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Secrets are normally supplied this way rather than in the file:
    /// `OPENAI_API_KEY`, `SUPABASE_URL`, `SUPABASE_PRIVATE_KEY`, plus
    /// `PDF_RAG_QUERY` for the question asked by the query script.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            if self.embeddings.api_key.is_none() {
                self.embeddings.api_key = Some(key.clone());
            }
            if self.llm.api_key.is_none() {
                self.llm.api_key = Some(key);
            }
        }
        if let Some(url) = lookup("SUPABASE_URL") {
            self.vector_store.url = url;
        }
        if let Some(key) = lookup("SUPABASE_PRIVATE_KEY") {
            self.vector_store.service_key = Some(key);
        }
        if let Some(question) = lookup("PDF_RAG_QUERY") {
            self.query.question = question;
        }
    }

    /// Reject settings the pipelines cannot run with
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.embeddings.provider == ProviderKind::OpenAi && self.embeddings.api_key.is_none() {
            return Err(Error::config("OpenAI embeddings require OPENAI_API_KEY"));
        }
        if self.llm.provider == ProviderKind::OpenAi && self.llm.api_key.is_none() {
            return Err(Error::config("OpenAI LLM requires OPENAI_API_KEY"));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::config("embeddings.batch_size must be at least 1"));
        }
        if self.vector_store.provider == VectorStoreKind::Supabase {
            if self.vector_store.url.trim().is_empty() {
                return Err(Error::config("Supabase vector store requires SUPABASE_URL"));
            }
            if self.vector_store.service_key.is_none() {
                return Err(Error::config(
                    "Supabase vector store requires SUPABASE_PRIVATE_KEY",
                ));
            }
        }
        Ok(())
    }
}

/// Query script configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Question asked by the query script
    pub question: String,
    /// Number of matches printed by the standalone similarity search
    pub search_k: usize,
    /// Number of context chunks handed to the QA chain
    pub qa_k: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            question: String::new(),
            search_k: 20,
            qa_k: 4,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 1,
        }
    }
}

impl ChunkingConfig {
    /// Check size/overlap consistency
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be at least 1"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// PDF extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound for parsing a single PDF, in seconds
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

/// Hosted model provider
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible API
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Backend
    pub provider: ProviderKind,
    /// Model name
    pub model: String,
    /// Embedding dimensions; must match the model (1536 for text-embedding-ada-002)
    pub dimensions: usize,
    /// Maximum inputs per embeddings request
    pub batch_size: usize,
    /// API base URL; each provider has its own default
    pub base_url: Option<String>,
    /// API key (usually from OPENAI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            batch_size: 512,
            base_url: None,
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend
    pub provider: ProviderKind,
    /// Generation model name
    pub model: String,
    /// API base URL; each provider has its own default
    pub base_url: Option<String>,
    /// API key (usually from OPENAI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: "gpt-3.5-turbo".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// Vector store backend
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreKind {
    /// Supabase (Postgres + pgvector over PostgREST)
    #[default]
    Supabase,
    /// In-process store, lost when the process exits
    Memory,
}

/// Vector database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// Backend
    pub provider: VectorStoreKind,
    /// Project URL (usually from SUPABASE_URL)
    pub url: String,
    /// Service role key (usually from SUPABASE_PRIVATE_KEY)
    #[serde(skip_serializing)]
    pub service_key: Option<String>,
    /// Table rows are inserted into
    pub table: String,
    /// SQL function performing the similarity search
    pub query_function: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: VectorStoreKind::Supabase,
            url: String::new(),
            service_key: None,
            table: "documents".to_string(),
            query_function: "match_documents".to_string(),
            timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_ingestion_settings() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 1);
        assert_eq!(config.download_dir.as_path(), Path::new("./documents"));
        assert_eq!(config.download_timeout_secs, None);
        assert_eq!(config.query.qa_k, 4);
        assert_eq!(config.vector_store.table, "documents");
    }

    #[test]
    fn test_partial_toml() {
        let config = RagConfig::from_toml(
            r#"
            sources = ["https://example.com/report.pdf", "local/notes.pdf"]
            download_dir = "/tmp/pdfs"
            download_timeout_secs = 600

            [chunking]
            chunk_size = 500

            [vector_store]
            provider = "memory"

            [embeddings]
            provider = "ollama"
            model = "nomic-embed-text"
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.download_dir.as_path(), Path::new("/tmp/pdfs"));
        assert_eq!(config.download_timeout_secs, Some(600));
        assert_eq!(config.extraction.timeout_secs, 60);
        assert_eq!(config.chunking.chunk_size, 500);
        assert_eq!(config.chunking.chunk_overlap, 1);
        assert_eq!(config.vector_store.provider, VectorStoreKind::Memory);
        assert_eq!(config.embeddings.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.provider, ProviderKind::OpenAi);
    }

    #[test]
    fn test_example_file_parses() {
        let config =
            RagConfig::from_toml(include_str!("../../../pdf-rag.toml.example")).unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.query.search_k, 20);
        assert_eq!(config.vector_store.query_function, "match_documents");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf-rag.toml");
        std::fs::write(&path, "[query]\nqa_k = 2\n").unwrap();

        let config = RagConfig::load(&path).unwrap();
        assert_eq!(config.query.qa_k, 2);
        assert!(matches!(
            RagConfig::load(dir.path().join("absent.toml")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("SUPABASE_URL", "https://proj.supabase.co"),
            ("SUPABASE_PRIVATE_KEY", "service-key"),
            ("PDF_RAG_QUERY", "What happened?"),
        ]
        .into_iter()
        .collect();

        let mut config = RagConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.embeddings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.vector_store.url, "https://proj.supabase.co");
        assert_eq!(config.query.question, "What happened?");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let config = RagConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_chunking() {
        let bad = ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 10,
        };
        assert!(bad.validate().is_err());
        assert!(ChunkingConfig::default().validate().is_ok());
    }
}
