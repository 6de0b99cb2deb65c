//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for prompt completion
///
/// Implementations:
/// - `OpenAiLlm`: OpenAI-compatible `/chat/completions` endpoint
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a fully built prompt
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
