//! Retrieval module - query expansion, parallel retrieval and RRF fusion
//!
//! Public interface:
//! - `QueryExpander` turns one user message into 2-5 search queries
//! - `Retriever` fans the queries out against the passage store
//! - `rrf_fuse` merges the per-query rankings into one ordered list
//!
//! The caller sequences the three and truncates the fused list to the
//! context size it wants.

mod engine;
mod expand;
mod fusion;

pub use engine::Retriever;
pub use expand::QueryExpander;
pub use fusion::{rrf_fuse, FusedPassage};
