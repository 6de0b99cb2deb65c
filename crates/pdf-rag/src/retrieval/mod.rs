//! Similarity search over the vector store

mod search;

pub use search::Retriever;
