//! Ingestion pipeline: fetch, extract, chunk, embed, store

mod chunker;
mod extractor;
mod fetcher;
mod processor;

pub use chunker::{TextChunker, TextSpan};
pub use extractor::{clean_text, Extractor, PdfSource, SourceLocation};
pub use fetcher::{fetch_bytes, is_remote, url_basename, Fetcher};
pub use processor::IngestPipeline;
