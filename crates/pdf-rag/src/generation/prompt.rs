//! Prompt templates for RAG generation

use crate::types::ScoredRecord;

/// Separator placed between context chunks
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join the retrieved chunk texts, best match first
    pub fn build_context(results: &[ScoredRecord]) -> String {
        results
            .iter()
            .map(|r| r.record.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Build the question-answering prompt with all context stuffed in
    pub fn build_qa_prompt(question: &str, results: &[ScoredRecord]) -> String {
        format!(
            "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:",
            context = Self::build_context(results),
            question = question.trim(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metadata, StoredRecord};

    fn scored(content: &str, similarity: f32) -> ScoredRecord {
        ScoredRecord {
            record: StoredRecord {
                id: None,
                content: content.to_string(),
                metadata: Metadata::new(),
                embedding: Vec::new(),
            },
            similarity,
        }
    }

    #[test]
    fn test_qa_prompt_layout() {
        let prompt = PromptBuilder::build_qa_prompt(
            " What grows? ",
            &[scored("Trees grow.", 0.9), scored("Grass grows too.", 0.5)],
        );

        assert!(prompt.starts_with("Use the following pieces of context"));
        assert!(prompt.contains("just say that you don't know"));
        assert!(prompt.contains("\n\nTrees grow.\n\nGrass grows too.\n\n"));
        assert!(prompt.ends_with("Question: What grows?\nHelpful Answer:"));
    }
}
