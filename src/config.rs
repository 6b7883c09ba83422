//! Configuration for Catedra
//!
//! Loaded from `.catedra/config.toml` in the working directory. A default
//! file is written on first use. API keys are never stored in the file;
//! each section names the environment variable that carries its secret.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Chat-completions provider (OpenAI-compatible endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    /// Environment variable holding the API key
    #[serde(default = "default_provider_key_env")]
    pub api_key_env: String,
    /// Model used for response generation and message translation
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    /// Ordered fallback chain for structured output, cheapest first
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

/// Passage store (Supabase-style REST endpoint with a match RPC)
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_url")]
    pub base_url: String,
    #[serde(default = "default_store_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Name of the similarity-search RPC function
    #[serde(default = "default_query_fn")]
    pub query_fn: String,
    /// Embedding model used to vectorize queries and documents
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Passages fetched per query
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
}

/// Retrieval tuning
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// RRF smoothing constant (default: 60, Cormack et al., 2009)
    #[serde(default = "default_rrf_k")]
    pub rrf_k: usize,
    /// Fused passages kept as turn context
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// Conversation behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Knowledge domain the corpus covers, used in prompts and the fallback answer
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Prior messages included in the generation prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Override for the canned answer used when a response is rejected
    #[serde(default)]
    pub fallback_answer: Option<String>,
}

fn default_provider_url() -> String {
    "https://chatapi.akash.network/api/v1".to_string()
}
fn default_provider_key_env() -> String {
    "AKASH_API_KEY".to_string()
}
fn default_generation_model() -> String {
    "Qwen3-235B-A22B-FP8".to_string()
}
fn default_fallback_models() -> Vec<String> {
    vec![
        "Qwen3-235B-A22B-FP8".to_string(),
        "Meta-Llama-4-Maverick-17B-128E-Instruct-FP8".to_string(),
    ]
}
fn default_temperature() -> f32 {
    0.6
}
fn default_provider_timeout() -> u64 {
    60
}
fn default_store_url() -> String {
    "https://project.supabase.co".to_string()
}
fn default_store_key_env() -> String {
    "SUPABASE_API_KEY".to_string()
}
fn default_table() -> String {
    "documents".to_string()
}
fn default_query_fn() -> String {
    "match_documents".to_string()
}
fn default_embedding_model() -> String {
    "BAAI-bge-large-en-v1-5".to_string()
}
fn default_k() -> usize {
    5
}
fn default_store_timeout() -> u64 {
    30
}
fn default_rrf_k() -> usize {
    60
}
fn default_top_n() -> usize {
    5
}
fn default_domain() -> String {
    "Inmunología".to_string()
}
fn default_history_window() -> usize {
    4
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key_env: default_provider_key_env(),
            generation_model: default_generation_model(),
            fallback_models: default_fallback_models(),
            temperature: default_temperature(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_store_url(),
            api_key_env: default_store_key_env(),
            table: default_table(),
            query_fn: default_query_fn(),
            embedding_model: default_embedding_model(),
            k: default_k(),
            timeout_secs: default_store_timeout(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
            top_n: default_top_n(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            history_window: default_history_window(),
            fallback_answer: None,
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("{} environment variable is required", self.api_key_env))
    }
}

impl StoreConfig {
    /// Resolve the store API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env)
            .with_context(|| format!("{} environment variable is required", self.api_key_env))
    }
}

impl ChatConfig {
    /// The canned answer substituted for rejected responses
    pub fn fallback_answer(&self) -> String {
        match &self.fallback_answer {
            Some(custom) => custom.clone(),
            None => format!(
                "No tengo la respuesta para eso! \nPuedo responderte solamente sobre {}",
                self.domain
            ),
        }
    }
}

const DEFAULT_CONFIG: &str = r#"# Catedra configuration
# API keys are read from the environment variables named below.

[provider]
base_url = "https://chatapi.akash.network/api/v1"
api_key_env = "AKASH_API_KEY"
generation_model = "Qwen3-235B-A22B-FP8"
fallback_models = ["Qwen3-235B-A22B-FP8", "Meta-Llama-4-Maverick-17B-128E-Instruct-FP8"]
temperature = 0.6
timeout_secs = 60

[store]
base_url = "https://project.supabase.co"
api_key_env = "SUPABASE_API_KEY"
table = "documents"
query_fn = "match_documents"
embedding_model = "BAAI-bge-large-en-v1-5"
k = 5
timeout_secs = 30

[retrieval]
rrf_k = 60
top_n = 5

[chat]
domain = "Inmunología"
history_window = 4
"#;

impl Config {
    /// Load configuration from `.catedra/config.toml`, creating the default file if missing
    pub fn load() -> Result<Self> {
        let config_path = Path::new(".catedra/config.toml");

        if !config_path.exists() {
            std::fs::create_dir_all(".catedra")?;
            std::fs::write(config_path, DEFAULT_CONFIG).context("Failed to write default config")?;
        }

        Self::load_from(config_path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        toml::from_str(&content).context("Failed to parse config TOML")
    }
}
