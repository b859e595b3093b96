//! # Promptdeck Core
//!
//! Domain types, traits, and error definitions for the Promptdeck
//! orchestration shim. This crate has **zero framework dependencies** — it
//! defines the capabilities that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two seams of the system are traits defined here: a [`Provider`]
//! produces raw text for a named model, a [`Handler`] post-processes that
//! text. Implementations live in their respective crates. This enables:
//! - Swapping backends and post-processing strategies via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod handler;
pub mod provider;
pub mod state;

// Re-export key types at crate root for ergonomics
pub use error::{GenerationError, ProviderError, StateError};
pub use handler::Handler;
pub use provider::{Provider, ProviderParams, canonical_params};
pub use state::{
    ContextStateSnapshot, InteractionRecord, MetricsCounters, ModelStateSnapshot, ScratchData,
    StateDocument,
};
