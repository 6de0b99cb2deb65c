//! Query binary: similarity search plus a retrieval-QA answer
//!
//! Run with: PDF_RAG_QUERY="..." cargo run -p pdf-rag --bin pdf-rag-query

use pdf_rag::{providers, RagConfig, RetrievalQa, Retriever};
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
        tracing::error!("Query failed: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let config = RagConfig::from_env()?;
    config.validate()?;

    let question = config.query.question.trim();
    if question.is_empty() {
        anyhow::bail!("no question configured; set PDF_RAG_QUERY or `query.question`");
    }

    let embedder = providers::build_embedder(&config.embeddings)?;
    let store = providers::build_vector_store(&config.vector_store)?;
    let llm = providers::build_llm(&config.llm)?;
    let retriever = Retriever::new(embedder, store);

    let results = retriever
        .similarity_search(question, config.query.search_k)
        .await?;
    println!("Similarity search ({} results):", results.len());
    for (rank, hit) in results.iter().enumerate() {
        println!(
            "{:>3}. [{:.4}] {} p.{}",
            rank + 1,
            hit.similarity,
            hit.record.source().unwrap_or("<unknown>"),
            hit.record
                .page_number()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "?".to_string())
        );
        println!("     {}", hit.record.content.replace('\n', " "));
    }

    let qa = RetrievalQa::new(retriever, llm, config.query.qa_k);
    let answer = qa.ask(question).await?;

    println!("\nAnswer:\n{}", answer.text);
    Ok(())
}
