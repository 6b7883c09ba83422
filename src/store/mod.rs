//! Passage store - vector-backed document retrieval
//!
//! The pipeline only depends on the `PassageStore` trait; the HTTP
//! implementation and the embeddings client it needs live here as thin
//! wrappers over the remote services.

mod embeddings;
mod http;

pub use embeddings::{cosine_similarity, EmbeddingsClient};
pub use http::HttpPassageStore;

use anyhow::Result;

/// One retrieved text chunk with provenance
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub content: String,
    /// Originating document, when the store records it
    pub source: Option<String>,
    /// Store-native relevance score (scale depends on the backend)
    pub score: f32,
}

/// A chunk headed into the store
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub source: Option<String>,
}

/// Vector store interface
///
/// `query` returns at most `k` passages, best match first. Implementations
/// must surface failures as errors; the retriever decides how to contain
/// them.
pub trait PassageStore: Send + Sync {
    fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredPassage>>;
}
