//! Ingestion pipeline orchestration

use chrono::Utc;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{Chunk, IngestReport, StoredRecord};

use super::chunker::TextChunker;
use super::extractor::Extractor;
use super::fetcher::{is_remote, Fetcher};

/// Fetch, extract, chunk, embed and store
pub struct IngestPipeline {
    fetcher: Fetcher,
    extractor: Extractor,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        config: &RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.download_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            fetcher: Fetcher::new(client.clone(), &config.download_dir),
            extractor: Extractor::new(
                client,
                Duration::from_secs(config.extraction.timeout_secs),
            ),
            chunker: TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?,
            embedder,
            store,
        })
    }

    /// Run every stage in order, stopping at the first fatal error
    pub async fn run(&self, sources: &[String]) -> Result<IngestReport> {
        let started_at = Utc::now();
        let timer = Instant::now();

        tracing::info!("Ingesting {} sources", sources.len());
        let paths = self.fetcher.fetch_all(sources).await?;
        let downloaded = sources.iter().filter(|s| is_remote(s)).count();

        let locations: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        let documents = self.extractor.extract_all(&locations).await;
        if documents.is_empty() {
            return Err(Error::NoDocuments(sources.len()));
        }

        let extracted: HashSet<&str> = documents.iter().filter_map(|d| d.source()).collect();
        let empty_sources: Vec<String> = sources
            .iter()
            .zip(&locations)
            .filter(|(_, location)| !extracted.contains(location.as_str()))
            .map(|(source, _)| source.clone())
            .collect();
        for source in &empty_sources {
            tracing::warn!("No documents extracted from {}", source);
        }

        let chunks = self.chunker.split_documents(&documents);
        tracing::info!(
            "Split {} documents into {} chunks (size {}, overlap {})",
            documents.len(),
            chunks.len(),
            self.chunker.chunk_size(),
            self.chunker.chunk_overlap()
        );
        let chunk_count = chunks.len();

        let stored = self.store_chunks(chunks).await?;

        let report = IngestReport {
            started_at,
            elapsed_ms: timer.elapsed().as_millis() as u64,
            sources: sources.len(),
            downloaded,
            documents: documents.len(),
            chunks: chunk_count,
            stored,
            empty_sources,
        };
        tracing::info!(
            "Ingestion complete: {} records stored in {}ms",
            report.stored,
            report.elapsed_ms
        );
        Ok(report)
    }

    /// Embed every chunk and write all records in one store call
    pub async fn store_chunks(&self, chunks: Vec<Chunk>) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        tracing::info!("Embedding {} chunks with {}", texts.len(), self.embedder.name());
        let embeddings = self.embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }
        let dimensions = self.embedder.dimensions();
        if let Some(pos) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(Error::embedding(format!(
                "embedding {} has dimension {}, {} is configured for {}",
                pos,
                embeddings[pos].len(),
                self.embedder.name(),
                dimensions
            )));
        }

        let records: Vec<StoredRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredRecord::from_chunk(chunk, embedding))
            .collect();

        let stored = self.store.upsert(&records).await?;
        tracing::info!("Stored {} records in {}", stored, self.store.name());
        Ok(stored)
    }
}
