//! Error types for the Promptdeck domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.
//!
//! Lookup misses (unknown context/model/handler names, missing prompt
//! templates) are *not* errors — they surface as `bool`/`Option`/empty
//! values at the call site. Only generation and persistence failures are
//! represented here.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`crate::Provider`] backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The configured provider id has no registered implementation.
    /// A configuration mistake, fatal for the request — never retried.
    #[error("Provider not registered: {0}")]
    Unavailable(String),

    /// The provider itself failed to produce a response.
    #[error("Provider {provider} failed: {reason}")]
    Invoke { provider: String, reason: String },
}

/// Errors raised by the response-generation pipeline.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The selected model has no descriptor in the configuration.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors raised while persisting state to disk.
///
/// Import failures are deliberately *not* here: importing reports success
/// as a `bool` and leaves state untouched on failure.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to write state to {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}
