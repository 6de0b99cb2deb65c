//! Retrieval-augmented question answering

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::Retriever;
use crate::types::Answer;

use super::prompt::PromptBuilder;

/// Default number of chunks stuffed into the prompt
pub const DEFAULT_QA_K: usize = 4;

/// Retrieve context for a question and have the LLM answer from it
pub struct RetrievalQa {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    k: usize,
}

impl RetrievalQa {
    pub fn new(retriever: Retriever, llm: Arc<dyn LlmProvider>, k: usize) -> Self {
        Self { retriever, llm, k }
    }

    /// Answer `question` from the `k` most similar stored chunks
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let context = self.retriever.similarity_search(question, self.k).await?;
        let prompt = PromptBuilder::build_qa_prompt(question, &context.matches);

        tracing::info!(
            "Asking {} ({}) with {} context chunks",
            self.llm.name(),
            self.llm.model(),
            context.len()
        );
        let text = self.llm.complete(&prompt).await?;

        Ok(Answer {
            text: text.trim().to_string(),
            sources: context.matches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::{EmbeddingProvider, MemoryVectorStore, VectorStoreProvider};
    use crate::test_support::{KeywordEmbedder, RecordingLlm};
    use crate::types::{Chunk, Document, StoredRecord};

    async fn retriever(texts: &[&str]) -> Retriever {
        let embedder = Arc::new(KeywordEmbedder::new(128));
        let store = Arc::new(MemoryVectorStore::new());

        let mut records = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let chunk = Chunk::from_parent(&Document::new(*text), text.to_string(), i, 0, text.len());
            records.push(StoredRecord::from_chunk(chunk, embedder.embed(text).await.unwrap()));
        }
        store.upsert(&records).await.unwrap();

        Retriever::new(embedder, store)
    }

    #[tokio::test]
    async fn test_answer_uses_retrieved_context() {
        let texts = [
            "The capital of France is Paris",
            "Bananas are rich in potassium",
            "The Nile is a river in Africa",
            "Rust has a borrow checker",
            "Mount Everest is the tallest mountain",
            "Paris hosts the Louvre museum",
        ];
        let llm = Arc::new(RecordingLlm::answering("  Paris.\n"));
        let qa = RetrievalQa::new(retriever(&texts).await, llm.clone(), 2);

        let answer = qa.ask("What is the capital of France?").await.unwrap();

        assert_eq!(answer.text, "Paris.");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0].record.content, "The capital of France is Paris");

        let prompts = llm.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("The capital of France is Paris"));
        assert!(prompts[0].contains("Question: What is the capital of France?"));
        assert!(!prompts[0].contains("Bananas"));
    }

    #[tokio::test]
    async fn test_llm_error_surfaces_unchanged() {
        let llm = Arc::new(RecordingLlm::failing("rate limited"));
        let qa = RetrievalQa::new(retriever(&["some context"]).await, llm, DEFAULT_QA_K);

        let err = qa.ask("question?").await.unwrap_err();

        assert!(matches!(err, Error::Llm(ref m) if m == "rate limited"));
    }

    #[tokio::test]
    async fn test_empty_store_never_reaches_llm() {
        let llm = Arc::new(RecordingLlm::answering("unused"));
        let retriever = Retriever::new(
            Arc::new(KeywordEmbedder::new(16)),
            Arc::new(MemoryVectorStore::new()),
        );
        let qa = RetrievalQa::new(retriever, llm.clone(), DEFAULT_QA_K);

        assert!(matches!(qa.ask("anything").await, Err(Error::Retrieval(_))));
        assert!(llm.prompts.lock().is_empty());
    }
}
