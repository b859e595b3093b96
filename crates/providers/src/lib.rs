//! Provider backends for Promptdeck.
//!
//! All providers implement the `promptdeck_core::Provider` trait.
//! The registry maps configured provider ids to backend instances.
//!
//! The built-in backends are stand-ins: they format a canned response
//! instead of calling a real API, which keeps the orchestration pipeline
//! fully exercisable offline. A real integration would replace the body of
//! `invoke` and nothing else.

pub mod anthropic;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use registry::ProviderRegistry;

/// First 50 characters of a prompt, for echoing back in stub responses.
pub(crate) fn prompt_snippet(prompt: &str) -> String {
    prompt.chars().take(50).collect()
}
