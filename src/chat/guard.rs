//! Hallucination gate - reject responses the context does not support
//!
//! One structured classification call behind the model-fallback chain. A
//! positive verdict swaps the response for the configured canned answer.
//! When the classifier itself is unavailable the gate fails open: the
//! response passes through with a logged warning. Killing every answer on
//! classifier downtime was the alternative; the pass-through matches how
//! an unknown verdict is treated elsewhere in the pipeline.

use anyhow::Result;
use serde::Deserialize;

use crate::llm::{structured_output, ChatModel};
use crate::prompt;

#[derive(Debug, Default, Deserialize)]
struct Verdict {
    #[serde(default)]
    is_hallucination: bool,
}

/// Classifies generated responses against their retrieval context
pub struct HallucinationGate<'a> {
    model: &'a dyn ChatModel,
    fallback_models: &'a [String],
}

impl<'a> HallucinationGate<'a> {
    pub fn new(model: &'a dyn ChatModel, fallback_models: &'a [String]) -> Self {
        Self {
            model,
            fallback_models,
        }
    }

    /// Ask whether `response` is supported by `context`
    pub fn check(&self, response: &str, context: &str) -> Result<bool> {
        let check_prompt = prompt::hallucination_detector(response, context);
        let verdict: Verdict =
            structured_output(self.model, self.fallback_models, &check_prompt, |_| Ok(()))?;
        Ok(verdict.is_hallucination)
    }

    /// Gate a response: hallucinations become `fallback`, everything else
    /// (including an unobtainable verdict) passes through.
    pub fn screen(&self, response: String, context: &str, fallback: &str) -> String {
        match self.check(&response, context) {
            Ok(true) => {
                tracing::debug!("response flagged as hallucination, substituting fallback answer");
                fallback.to_string()
            }
            Ok(false) => response,
            Err(e) => {
                tracing::warn!("hallucination check unavailable, passing response through: {:#}", e);
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VerdictModel {
        reply: &'static str,
    }

    impl ChatModel for VerdictModel {
        fn invoke(&self, _model: &str, _prompt: &str, _temperature: f32) -> Result<String> {
            if self.reply == "error" {
                anyhow::bail!("classifier down");
            }
            Ok(self.reply.to_string())
        }
    }

    fn chain() -> Vec<String> {
        vec!["cheap".to_string()]
    }

    #[test]
    fn test_hallucination_replaced_with_fallback() {
        let model = VerdictModel {
            reply: r#"{"is_hallucination": true}"#,
        };
        let models = chain();
        let gate = HallucinationGate::new(&model, &models);

        let out = gate.screen("respuesta inventada".to_string(), "contexto", "No tengo la respuesta");

        assert_eq!(out, "No tengo la respuesta");
    }

    #[test]
    fn test_grounded_response_passes() {
        let model = VerdictModel {
            reply: r#"{"is_hallucination": false}"#,
        };
        let models = chain();
        let gate = HallucinationGate::new(&model, &models);

        let out = gate.screen("respuesta real".to_string(), "contexto", "fallback");

        assert_eq!(out, "respuesta real");
    }

    #[test]
    fn test_missing_field_defaults_to_not_hallucination() {
        // Mirrors the schema default: an empty object is a negative verdict
        let model = VerdictModel { reply: "{}" };
        let models = chain();
        let gate = HallucinationGate::new(&model, &models);

        assert!(!gate.check("r", "c").unwrap());
    }

    #[test]
    fn test_classifier_failure_passes_through() {
        let model = VerdictModel { reply: "error" };
        let models = chain();
        let gate = HallucinationGate::new(&model, &models);

        let out = gate.screen("respuesta".to_string(), "contexto", "fallback");

        assert_eq!(out, "respuesta");
    }
}
