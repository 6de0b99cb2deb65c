//! Error types for the ingestion and query pipelines

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Download of a remote source failed
    #[error("Failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    /// PDF parsing error
    #[error("Failed to parse PDF '{source_name}': {message}")]
    PdfParse { source_name: String, message: String },

    /// Extraction produced nothing to embed
    #[error("No documents could be extracted from {0} source(s)")]
    NoDocuments(usize),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector database error
    #[error("Vector database error: {0}")]
    VectorDb(String),

    /// Similarity search returned nothing usable
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a PDF parse error
    pub fn pdf_parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PdfParse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector db error
    pub fn vector_db(message: impl Into<String>) -> Self {
        Self::VectorDb(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::fetch("https://example.com/a.pdf", "HTTP 404 Not Found");
        assert_eq!(
            err.to_string(),
            "Failed to fetch 'https://example.com/a.pdf': HTTP 404 Not Found"
        );

        let err = Error::pdf_parse("broken.pdf", "invalid file header");
        assert!(err.to_string().contains("broken.pdf"));
    }
}
