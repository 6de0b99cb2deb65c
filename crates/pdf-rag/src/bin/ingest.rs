//! Ingestion binary
//!
//! Run with: cargo run -p pdf-rag --bin pdf-rag-ingest

use pdf_rag::{providers, IngestPipeline, RagConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_rag=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Ingestion failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = RagConfig::from_env()?;
    config.validate()?;

    if config.sources.is_empty() {
        anyhow::bail!("no sources configured; add PDF paths or URLs to `sources`");
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Sources: {}", config.sources.len());
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!(
        "  - Chunk size: {} (overlap {})",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    let embedder = providers::build_embedder(&config.embeddings)?;
    let store = providers::build_vector_store(&config.vector_store)?;
    let pipeline = IngestPipeline::new(&config, embedder, store)?;

    let report = pipeline.run(&config.sources).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
