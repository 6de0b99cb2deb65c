//! Core types shared by the ingestion and query pipelines

pub mod document;
pub mod response;

pub use document::{Chunk, Document, Embedding, Metadata, StoredRecord};
pub use response::{Answer, IngestReport, QueryResult, ScoredRecord};
