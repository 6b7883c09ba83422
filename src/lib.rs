pub mod chat;
pub mod config;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod store;

// Re-export commonly used types
pub use chat::{Message, Role, TurnObserver, Workflow};
pub use config::Config;
pub use store::{PassageStore, ScoredPassage};
