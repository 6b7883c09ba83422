//! Chat-completions client for OpenAI-compatible endpoints
//!
//! Blocking HTTP only. The `ChatModel` trait is the seam the pipeline is
//! built against; `HttpChatClient` is the production implementation and
//! tests swap in canned fakes.

mod structured;

pub use structured::structured_output;

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ProviderConfig;

/// Synchronous chat-model interface
///
/// `invoke_json` requests a JSON-object response where the endpoint supports
/// constrained decoding; the default implementation falls back to a plain
/// invocation for backends without that switch.
pub trait ChatModel: Send + Sync {
    /// Run one completion and return the raw response text
    fn invoke(&self, model: &str, prompt: &str, temperature: f32) -> Result<String>;

    /// Run one completion in JSON mode
    fn invoke_json(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        self.invoke(model, prompt, temperature)
    }
}

/// Strip hidden deliberation emitted by reasoning models.
///
/// Everything up to and including the first `</think>` marker is discarded;
/// text without the marker passes through unchanged.
pub fn strip_think(text: &str) -> &str {
    match text.split_once("</think>") {
        Some((_, rest)) => rest.trim(),
        None => text,
    }
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint
pub struct HttpChatClient {
    base_url: String,
    api_key: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl HttpChatClient {
    /// Create a client for the configured provider
    pub fn new(provider: &ProviderConfig) -> Result<Self> {
        let api_key = provider.api_key()?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    fn chat(&self, model: &str, prompt: &str, temperature: f32, json_mode: bool) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages: vec![WireMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach chat endpoint at {}", self.base_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            anyhow::bail!("Chat completion failed ({}): {}", status, body);
        }

        let completion: ChatResponse = response
            .json()
            .context("Failed to parse chat completion response")?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("Chat completion returned no choices"))
    }

    /// List model ids served by the endpoint (used by `doctor`)
    pub fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Model listing failed: {}", response.status());
        }

        let list: ModelList = response.json().context("Failed to parse model list")?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

impl ChatModel for HttpChatClient {
    fn invoke(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        self.chat(model, prompt, temperature, false)
    }

    fn invoke_json(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        self.chat(model, prompt, temperature, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_think_removes_deliberation() {
        let raw = "<think>razonando sobre vacunas</think>\n\nLa respuesta final.";
        assert_eq!(strip_think(raw), "La respuesta final.");
    }

    #[test]
    fn test_strip_think_keeps_plain_text() {
        assert_eq!(strip_think("Sin marcador."), "Sin marcador.");
    }

    #[test]
    fn test_strip_think_only_first_marker() {
        let raw = "a</think>b</think>c";
        assert_eq!(strip_think(raw), "b</think>c");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "Qwen3-235B-A22B-FP8",
            messages: vec![WireMessage {
                role: "user",
                content: "hola",
            }],
            temperature: 0.6,
            response_format: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("Qwen3-235B-A22B-FP8"));
        assert!(json.contains("\"temperature\":0.6"));
        assert!(!json.contains("response_format"));
    }

    #[test]
    fn test_chat_request_json_mode() {
        let request = ChatRequest {
            model: "m",
            messages: vec![],
            temperature: 0.0,
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"type\":\"json_object\""));
    }
}
