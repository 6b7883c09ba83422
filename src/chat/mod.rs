//! Conversation workflow - retrieve, generate, validate
//!
//! Public interface:
//! - `Workflow::invoke_turn` runs one user turn through the three-node
//!   pipeline and returns the extended history
//! - `TurnObserver` for UI progress callbacks (no control-flow authority)
//! - `Message`/`Role` for conversation history

mod graph;
mod guard;
mod observer;
mod state;

pub use graph::Workflow;
pub use guard::HallucinationGate;
pub use observer::{NodeKind, TurnObserver};
pub use state::{Message, Role};
