//! Conversation state threaded through the workflow nodes

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One conversation message, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-turn working state
///
/// Built at turn start from the caller's history, mutated only by the
/// driver merging node updates, torn down at turn end.
#[derive(Debug)]
pub(crate) struct TurnState {
    pub messages: Vec<Message>,
    pub context: Option<String>,
    pub response: Option<String>,
}

impl TurnState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            context: None,
            response: None,
        }
    }

    /// The message that started this turn
    pub fn question(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Fold a node's partial update into the state.
    ///
    /// Messages are append-only: an update can add one, never rewrite
    /// earlier history.
    pub fn merge(&mut self, update: NodeUpdate) {
        if let Some(context) = update.context {
            self.context = Some(context);
        }
        if let Some(response) = update.response {
            self.response = Some(response);
        }
        if let Some(message) = update.message {
            self.messages.push(message);
        }
    }
}

/// Partial state produced by one node
#[derive(Debug, Default)]
pub(crate) struct NodeUpdate {
    pub context: Option<String>,
    pub response: Option<String>,
    pub message: Option<Message>,
}
