//! pdf-rag: PDF ingestion into a vector store and retrieval-augmented QA
//!
//! Ingestion fetches PDFs (local paths or URLs), extracts one document per
//! page, splits pages into overlapping chunks, embeds them and writes them to
//! a vector store. Querying embeds a question, retrieves the nearest chunks
//! and asks an LLM to answer from that context.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::RetrievalQa;
pub use ingestion::{IngestPipeline, TextChunker};
pub use retrieval::Retriever;
pub use types::{
    document::{Chunk, Document, Metadata, StoredRecord},
    response::{Answer, IngestReport, QueryResult, ScoredRecord},
};
