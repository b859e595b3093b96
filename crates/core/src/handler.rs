//! Handler trait — post-processing strategies for raw model output.
//!
//! A handler reframes raw provider text (chain-of-thought prefixing,
//! agent framing, or a plain pass-through). Handlers are pure text
//! transforms: no I/O, no state, and their output is never memoized —
//! only the raw provider response is.

/// A response post-processing strategy.
pub trait Handler: Send + Sync {
    /// The handler name this strategy is registered under (e.g. "chain").
    fn name(&self) -> &str;

    /// Transform the raw provider response.
    fn postprocess(&self, response: &str) -> String;
}
