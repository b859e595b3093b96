//! Anthropic-shaped provider stand-in.

use promptdeck_core::{Provider, ProviderError, ProviderParams};

use crate::prompt_snippet;

/// Stand-in for an Anthropic backend.
#[derive(Debug, Default)]
pub struct AnthropicProvider;

impl AnthropicProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn invoke(
        &self,
        model: &str,
        prompt: &str,
        params: &ProviderParams,
    ) -> Result<String, ProviderError> {
        tracing::trace!(model, params = ?params, "anthropic stub invoked");
        Ok(format!(
            "Anthropic response for {model}: {}...",
            prompt_snippet(prompt)
        ))
    }
}
