//! HTTP passage store - Supabase-style REST backend
//!
//! Similarity search goes through an RPC function (`match_documents` by
//! default) that takes a query embedding and a match count; inserts go
//! straight into the documents table. Queries are embedded client-side.

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{Document, EmbeddingsClient, PassageStore, ScoredPassage};
use crate::config::{ProviderConfig, StoreConfig};

/// Passage store backed by a Supabase-compatible REST endpoint
pub struct HttpPassageStore {
    base_url: String,
    api_key: String,
    table: String,
    query_fn: String,
    embedder: EmbeddingsClient,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct MatchRequest {
    query_embedding: Vec<f32>,
    match_count: usize,
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    content: String,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    similarity: f32,
}

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    content: &'a str,
    metadata: Value,
    embedding: &'a [f32],
}

impl MatchRow {
    fn into_passage(self) -> ScoredPassage {
        let source = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("source"))
            .and_then(|s| s.as_str())
            .map(|s| s.to_string());

        ScoredPassage {
            content: self.content,
            source,
            score: self.similarity,
        }
    }
}

impl HttpPassageStore {
    /// Create a store client; the embedder shares the provider endpoint
    pub fn new(store: &StoreConfig, provider: &ProviderConfig) -> Result<Self> {
        let api_key = store.api_key()?;
        let embedder = EmbeddingsClient::new(provider, store)?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(store.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: store.base_url.trim_end_matches('/').to_string(),
            api_key,
            table: store.table.clone(),
            query_fn: store.query_fn.clone(),
            embedder,
            http,
        })
    }

    /// Insert documents with their embeddings, returning the inserted count
    pub fn insert(&self, documents: &[Document]) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed(&texts)?;

        let rows: Vec<InsertRow> = documents
            .iter()
            .zip(embeddings.iter())
            .map(|(doc, embedding)| InsertRow {
                content: &doc.content,
                metadata: match &doc.source {
                    Some(source) => serde_json::json!({ "source": source }),
                    None => serde_json::json!({}),
                },
                embedding,
            })
            .collect();

        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&rows)
            .send()
            .with_context(|| format!("Failed to reach passage store at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Document insert failed ({}): {}", status, body);
        }

        Ok(rows.len())
    }

    /// Cheap reachability probe (used by `doctor`)
    pub fn health(&self) -> Result<()> {
        let url = format!("{}/rest/v1/{}?select=id&limit=1", self.base_url, self.table);
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .with_context(|| format!("Failed to reach passage store at {}", self.base_url))?;

        if !response.status().is_success() {
            anyhow::bail!("Passage store returned status: {}", response.status());
        }

        Ok(())
    }
}

impl PassageStore for HttpPassageStore {
    fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredPassage>> {
        let query_embedding = self.embedder.embed_query(text)?;

        let url = format!("{}/rest/v1/rpc/{}", self.base_url, self.query_fn);
        let request = MatchRequest {
            query_embedding,
            match_count: k,
        };

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach passage store at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Passage query failed ({}): {}", status, body);
        }

        let rows: Vec<MatchRow> = response
            .json()
            .context("Failed to parse passage query response")?;

        // The RPC already orders by similarity, best match first
        Ok(rows.into_iter().map(MatchRow::into_passage).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_row_with_source() {
        let json = r#"{"content": "las vacunas vivas", "metadata": {"source": "tema3.md"}, "similarity": 0.87}"#;
        let row: MatchRow = serde_json::from_str(json).unwrap();
        let passage = row.into_passage();

        assert_eq!(passage.content, "las vacunas vivas");
        assert_eq!(passage.source.as_deref(), Some("tema3.md"));
        assert!((passage.score - 0.87).abs() < 1e-6);
    }

    #[test]
    fn test_match_row_without_metadata() {
        let json = r#"{"content": "texto suelto"}"#;
        let row: MatchRow = serde_json::from_str(json).unwrap();
        let passage = row.into_passage();

        assert_eq!(passage.content, "texto suelto");
        assert!(passage.source.is_none());
        assert_eq!(passage.score, 0.0);
    }

    #[test]
    fn test_match_request_serialization() {
        let request = MatchRequest {
            query_embedding: vec![0.1, 0.2],
            match_count: 5,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"match_count\":5"));
        assert!(json.contains("query_embedding"));
    }
}
