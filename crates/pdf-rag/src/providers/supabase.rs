//! Supabase vector store (Postgres + pgvector behind PostgREST)
//!
//! Expects the usual Supabase layout: a table with `content`, `metadata`
//! and `embedding` columns, and a SQL function taking `query_embedding` and
//! `match_count` that returns `id, content, metadata, similarity` rows.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::VectorStoreConfig;
use crate::error::{Error, Result};
use crate::types::{Metadata, ScoredRecord, StoredRecord};

use super::vector_store::VectorStoreProvider;

#[derive(Serialize)]
struct InsertRow<'a> {
    content: &'a str,
    metadata: &'a Metadata,
    embedding: &'a [f32],
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}

#[derive(Deserialize)]
struct MatchRow {
    #[serde(default)]
    id: Option<Value>,
    content: String,
    #[serde(default)]
    metadata: Metadata,
    similarity: f32,
}

/// Supabase-backed vector store
pub struct SupabaseVectorStore {
    client: Client,
    insert_url: String,
    match_url: String,
}

impl SupabaseVectorStore {
    /// Create a store client from configuration
    pub fn new(config: &VectorStoreConfig) -> Result<Self> {
        let base = config.url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(Error::config("missing Supabase URL"));
        }
        let key = config
            .service_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("missing Supabase service key"))?;

        let invalid = |_| Error::config("invalid Supabase service key");
        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            insert_url: format!("{}/rest/v1/{}", base, config.table),
            match_url: format!("{}/rest/v1/rpc/{}", base, config.query_function),
        })
    }
}

#[async_trait]
impl VectorStoreProvider for SupabaseVectorStore {
    async fn upsert(&self, records: &[StoredRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        if let Some(pos) = records.iter().position(|r| r.embedding.is_empty()) {
            return Err(Error::vector_db(format!("record {} has no embedding", pos)));
        }

        let rows: Vec<InsertRow<'_>> = records
            .iter()
            .map(|r| InsertRow {
                content: &r.content,
                metadata: &r.metadata,
                embedding: &r.embedding,
            })
            .collect();

        let response = self
            .client
            .post(&self.insert_url)
            .header("Prefer", "return=minimal")
            .json(&rows)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Insert request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_db(format!(
                "Insert failed: HTTP {} - {}",
                status, body
            )));
        }

        tracing::info!(rows = rows.len(), url = %self.insert_url, "Stored records in Supabase");
        Ok(rows.len())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredRecord>> {
        let request = MatchRequest {
            query_embedding: embedding,
            match_count: k,
        };

        let response = self
            .client
            .post(&self.match_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::vector_db(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_db(format!(
                "Search failed: HTTP {} - {}",
                status, body
            )));
        }

        let rows: Vec<MatchRow> = response
            .json()
            .await
            .map_err(|e| Error::vector_db(format!("Failed to parse search response: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| ScoredRecord {
                record: StoredRecord {
                    id: row.id.map(|id| match id {
                        Value::String(s) => s,
                        other => other.to_string(),
                    }),
                    content: row.content,
                    metadata: row.metadata,
                    embedding: Vec::new(),
                },
                similarity: row.similarity,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
