//! Workflow driver - the linear retrieve/generate/validate pipeline
//!
//! Each node is a pure function of the incoming state producing a partial
//! update; the driver merges updates between nodes and notifies observers.
//! Retries never happen at this level - they live inside the structured
//! model-invocation contract.

use anyhow::Result;

use super::guard::HallucinationGate;
use super::observer::{NodeKind, TurnObserver};
use super::state::{Message, NodeUpdate, Role, TurnState};
use crate::config::Config;
use crate::llm::{strip_think, ChatModel};
use crate::prompt;
use crate::retrieval::{rrf_fuse, QueryExpander, Retriever};
use crate::store::PassageStore;

/// One-turn conversation pipeline over a model and a passage store
pub struct Workflow {
    model: Box<dyn ChatModel>,
    store: Box<dyn PassageStore>,
    config: Config,
}

impl Workflow {
    pub fn new(model: Box<dyn ChatModel>, store: Box<dyn PassageStore>, config: Config) -> Self {
        Self {
            model,
            store,
            config,
        }
    }

    /// Run one turn and return the extended history.
    ///
    /// The history must end with a user message - anything else is a
    /// caller bug and fails immediately. Exactly one assistant message is
    /// appended; earlier messages are never dropped or rewritten.
    pub fn invoke_turn(
        &self,
        history: Vec<Message>,
        observers: &[&dyn TurnObserver],
    ) -> Result<Vec<Message>> {
        let ends_with_user = history.last().map(|m| m.role == Role::User).unwrap_or(false);
        if !ends_with_user {
            anyhow::bail!("Conversation history must end with a user message");
        }

        let mut state = TurnState::new(history);

        for node in NodeKind::ALL {
            for observer in observers {
                observer.on_node_start(node);
            }

            let update = match node {
                NodeKind::RetrievePassages => self.retrieve_passages(&state),
                NodeKind::GenerateResponse => self.generate_response(&state, observers),
                NodeKind::ValidateResponse => self.validate_response(&state),
            };
            state.merge(update);

            for observer in observers {
                observer.on_node_end(node);
            }
        }

        Ok(state.messages)
    }

    /// Expand the question, fan out against the store, fuse and truncate.
    ///
    /// Expansion failure degrades to an empty context - the generation
    /// prompt already tells the model what to answer when it has no facts.
    fn retrieve_passages(&self, state: &TurnState) -> NodeUpdate {
        let expander = QueryExpander::new(
            self.model.as_ref(),
            &self.config.provider,
            &self.config.chat.domain,
        );

        let queries = match expander.expand(state.question()) {
            Ok(queries) => queries,
            Err(e) => {
                tracing::warn!("query expansion failed, continuing with empty context: {:#}", e);
                return NodeUpdate {
                    context: Some(String::new()),
                    ..Default::default()
                };
            }
        };

        let retriever = Retriever::new(self.store.as_ref(), self.config.store.k);
        let per_query = retriever.retrieve(&queries);
        let fused = rrf_fuse(&per_query, self.config.retrieval.rrf_k);

        let context = fused
            .iter()
            .take(self.config.retrieval.top_n)
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        NodeUpdate {
            context: Some(context),
            ..Default::default()
        }
    }

    /// Generate a grounded answer from context, recent history and the
    /// question. A failed generation leaves the response unset; the
    /// validation node turns that into the canned answer.
    fn generate_response(&self, state: &TurnState, observers: &[&dyn TurnObserver]) -> NodeUpdate {
        let context = state.context.as_deref().unwrap_or("");
        let previous = self.previous_messages(state);

        let gen_prompt = prompt::response_generation(context, state.question(), &previous);
        let raw = self.model.invoke(
            &self.config.provider.generation_model,
            &gen_prompt,
            self.config.provider.temperature,
        );

        let response = match raw {
            Ok(text) => strip_think(&text).to_string(),
            Err(e) => {
                tracing::warn!("response generation failed: {:#}", e);
                return NodeUpdate::default();
            }
        };

        for observer in observers {
            observer.on_token(&response);
        }

        NodeUpdate {
            response: Some(response),
            ..Default::default()
        }
    }

    /// Gate the response and append the turn's assistant message
    fn validate_response(&self, state: &TurnState) -> NodeUpdate {
        let fallback = self.config.chat.fallback_answer();
        let response = state.response.clone().unwrap_or_default();

        let final_text = if response.is_empty() {
            fallback
        } else {
            let context = state.context.as_deref().unwrap_or("");
            let gate =
                HallucinationGate::new(self.model.as_ref(), &self.config.provider.fallback_models);
            gate.screen(response, context, &fallback)
        };

        NodeUpdate {
            message: Some(Message::assistant(final_text)),
            ..Default::default()
        }
    }

    /// The last few prior messages, formatted for the generation prompt
    fn previous_messages(&self, state: &TurnState) -> String {
        let prior = &state.messages[..state.messages.len().saturating_sub(1)];
        let window = self.config.chat.history_window;
        let start = prior.len().saturating_sub(window);

        prior[start..]
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                format!("{}: {}", role, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
