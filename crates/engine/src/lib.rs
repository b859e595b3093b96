//! # Promptdeck Engine
//!
//! The response-generation pipeline and the state machines that feed it.
//!
//! - [`ContextRegistry`] — which prompt template frames the conversation,
//!   plus per-context scratch data and selection history.
//! - [`ModelRegistry`] — which backend answers and how the answer is
//!   post-processed; owns provider dispatch, the memoized response cache,
//!   and the metrics counters.
//! - [`Orchestrator`] — composes the two registries into a single
//!   `generate_response` entry point and keeps the interaction log.
//!
//! Everything is single-threaded and synchronous: mutations take
//! `&mut self`, there are no locks and no suspension points. A server
//! wrapping this engine must serialize access per logical session.

pub mod cache;
pub mod context;
pub mod handlers;
pub mod metrics;
pub mod model;
pub mod orchestrator;

pub use context::ContextRegistry;
pub use handlers::{
    AgentHandler, BasicHandler, ChainOfThoughtHandler, HandlerRegistry, TreeOfThoughtsHandler,
};
pub use metrics::MetricsSnapshot;
pub use model::ModelRegistry;
pub use orchestrator::{CurrentState, Orchestrator, Selection};
