//! Provider trait — the abstraction over model backends.
//!
//! A Provider knows how to turn a model name, a prompt, and a parameter set
//! into raw response text. Every backend (OpenAI-shaped, Anthropic-shaped,
//! test mocks) implements this trait; the generation pipeline dispatches to
//! the instance registered under the model's configured provider id without
//! knowing which backend it is.
//!
//! Everything here is synchronous: a provider call runs to completion or
//! fails, with no suspension points, cancellation, or retries.

use std::collections::BTreeMap;

use crate::error::ProviderError;

/// Parameters passed to a provider invocation.
///
/// A `BTreeMap` rather than a `HashMap` so that iteration and serialization
/// order is the sorted key order — two parameter sets with the same entries
/// are identical no matter how the caller assembled them. The memoization
/// key depends on this.
pub type ProviderParams = BTreeMap<String, serde_json::Value>;

/// Canonical string form of a parameter set, used as part of the
/// memoization key. Sorted key order comes from the `BTreeMap` itself.
pub fn canonical_params(params: &ProviderParams) -> String {
    serde_json::to_string(params).unwrap_or_default()
}

/// The core Provider trait.
pub trait Provider: Send + Sync {
    /// The provider id this backend is registered under (e.g. "openai").
    fn id(&self) -> &str;

    /// Produce raw response text for `model` given `prompt` and `params`.
    fn invoke(
        &self,
        model: &str,
        prompt: &str,
        params: &ProviderParams,
    ) -> Result<String, ProviderError>;
}
