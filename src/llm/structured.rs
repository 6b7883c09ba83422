//! Structured output with an ordered model-fallback chain
//!
//! Constrained decoding is unreliable enough that a single model cannot be
//! trusted to satisfy a schema. The chain is plain data: an ordered list of
//! model names tried under one uniform parse-validate-retry contract, no
//! per-model branches.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::{strip_think, ChatModel};

/// Request a schema-shaped response, falling back through `fallback_models`
/// in order until one yields output that deserializes and validates.
///
/// Structured calls always run at temperature 0. Every rejection is logged
/// and the next model is tried; when the chain is exhausted the last error
/// is returned.
pub fn structured_output<T, F>(
    model: &dyn ChatModel,
    fallback_models: &[String],
    prompt: &str,
    validate: F,
) -> Result<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<()>,
{
    if fallback_models.is_empty() {
        anyhow::bail!("No fallback models configured for structured output");
    }

    let mut last_error = None;

    for name in fallback_models {
        match try_model::<T, F>(model, name, prompt, &validate) {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("structured output from {} rejected: {:#}", name, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.expect("at least one model was tried"))
        .context("All fallback models exhausted for structured output")
}

fn try_model<T, F>(model: &dyn ChatModel, name: &str, prompt: &str, validate: &F) -> Result<T>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<()>,
{
    let raw = model.invoke_json(name, prompt, 0.0)?;
    let cleaned = strip_think(&raw);

    let value: T = serde_json::from_str(extract_json(cleaned))
        .context("Response does not match the requested schema")?;

    validate(&value)?;
    Ok(value)
}

/// Carve the JSON object out of a response that may wrap it in prose or
/// code fences.
fn extract_json(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end >= start => &text[start..=end],
        _ => text,
    }
}
