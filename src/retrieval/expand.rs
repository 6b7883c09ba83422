//! Query expansion - one user message into 2-5 diversified search queries
//!
//! Two model calls: a translation/normalization pass at the provider's
//! sampling temperature, then a schema-constrained decomposition at
//! temperature 0 behind the model-fallback chain.

use anyhow::Result;
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::llm::{strip_think, structured_output, ChatModel};
use crate::prompt;

/// Smallest query set the decomposition may return
pub const MIN_QUERIES: usize = 2;
/// Largest query set the decomposition may return
pub const MAX_QUERIES: usize = 5;

#[derive(Debug, Deserialize)]
struct QueryPlan {
    queries: Vec<String>,
}

/// Expands a raw user message into retrieval queries
pub struct QueryExpander<'a> {
    model: &'a dyn ChatModel,
    provider: &'a ProviderConfig,
    domain: &'a str,
}

impl<'a> QueryExpander<'a> {
    pub fn new(model: &'a dyn ChatModel, provider: &'a ProviderConfig, domain: &'a str) -> Self {
        Self {
            model,
            provider,
            domain,
        }
    }

    /// Produce 2-5 distinct queries for the user message.
    ///
    /// A model response with fewer than 2 or more than 5 distinct queries
    /// violates the schema and is retried on the next fallback model; when
    /// the whole chain is exhausted the error propagates and the caller
    /// degrades to an empty context.
    pub fn expand(&self, user_message: &str) -> Result<Vec<String>> {
        let translated = self.translate(user_message)?;

        let plan_prompt = prompt::queries_generator(&translated, self.domain);
        let plan: QueryPlan = structured_output(
            self.model,
            &self.provider.fallback_models,
            &plan_prompt,
            |plan: &QueryPlan| {
                let count = normalize(&plan.queries).len();
                if !(MIN_QUERIES..=MAX_QUERIES).contains(&count) {
                    anyhow::bail!(
                        "Expected {}..{} distinct queries, got {}",
                        MIN_QUERIES,
                        MAX_QUERIES,
                        count
                    );
                }
                Ok(())
            },
        )?;

        Ok(normalize(&plan.queries))
    }

    /// Translate the message into clear English before decomposition.
    ///
    /// Uses the head of the fallback chain (the cheap reasoner) at the
    /// provider's sampling temperature, with hidden reasoning stripped.
    fn translate(&self, user_message: &str) -> Result<String> {
        let model_name = self
            .provider
            .fallback_models
            .first()
            .unwrap_or(&self.provider.generation_model);

        let raw = self.model.invoke(
            model_name,
            &prompt::translate_user_message(user_message),
            self.provider.temperature,
        )?;

        Ok(strip_think(&raw).to_string())
    }
}

/// Trim, drop empties, dedup preserving first-encounter order
fn normalize(queries: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for query in queries {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.iter().any(|s: &String| s == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}
