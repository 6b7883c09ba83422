//! Embeddings client - raw text to fixed-length vectors
//!
//! Sends untokenized text straight to the provider's `/embeddings` endpoint;
//! the provider owns tokenization. Output order always matches input order.

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ProviderConfig, StoreConfig};

/// Client for an OpenAI-compatible embeddings endpoint
pub struct EmbeddingsClient {
    base_url: String,
    api_key: String,
    model: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    encoding_format: &'static str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl EmbeddingsClient {
    /// Create a client using the provider endpoint and the store's model choice
    pub fn new(provider: &ProviderConfig, store: &StoreConfig) -> Result<Self> {
        let api_key = provider.api_key()?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: store.embedding_model.clone(),
            http,
        })
    }

    /// Embed a batch of texts, one vector per input, order preserved
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // The endpoint chokes on leading/trailing whitespace in some models
        let clean_texts: Vec<&str> = texts.iter().map(|t| t.trim()).collect();

        let request = EmbeddingRequest {
            model: &self.model,
            input: clean_texts,
            encoding_format: "float",
        };

        let url = format!("{}/embeddings", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach embeddings endpoint at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Embedding request failed ({}): {}", status, body);
        }

        let parsed: EmbeddingResponse = response
            .json()
            .context("Failed to parse embedding response")?;

        if parsed.data.len() != texts.len() {
            anyhow::bail!(
                "Embedding count mismatch: sent {} texts, got {} vectors",
                texts.len(),
                parsed.data.len()
            );
        }

        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }

    /// Embed a single query string
    pub fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed(&texts)?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Embedding response was empty"))
    }
}

/// Cosine similarity between two vectors
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_embedding_request_serialization() {
        let request = EmbeddingRequest {
            model: "BAAI-bge-large-en-v1-5",
            input: vec!["recombinant vector vaccines"],
            encoding_format: "float",
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("BAAI-bge-large-en-v1-5"));
        assert!(json.contains("\"encoding_format\":\"float\""));
    }

    #[test]
    fn test_embedding_response_order() {
        let json = r#"{"data": [{"embedding": [1.0, 0.0]}, {"embedding": [0.0, 1.0]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![1.0, 0.0]);
        assert_eq!(parsed.data[1].embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![0.5, 0.5, 0.7];
        assert_relative_eq!(cosine_similarity(&v, &v), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert_relative_eq!(cosine_similarity(&a, &b), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert_relative_eq!(cosine_similarity(&a, &b), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
