//! OpenAI-shaped provider stand-in.

use promptdeck_core::{Provider, ProviderError, ProviderParams};

use crate::prompt_snippet;

/// Stand-in for an OpenAI backend. Echoes the model name and a prompt
/// snippet instead of performing a network call.
#[derive(Debug, Default)]
pub struct OpenAiProvider;

impl OpenAiProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn invoke(
        &self,
        model: &str,
        prompt: &str,
        params: &ProviderParams,
    ) -> Result<String, ProviderError> {
        tracing::trace!(model, params = ?params, "openai stub invoked");
        Ok(format!(
            "OpenAI response for {model}: {}...",
            prompt_snippet(prompt)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_names_the_model() {
        let provider = OpenAiProvider::new();
        let out = provider
            .invoke("gpt", "Hello, how are you?", &ProviderParams::new())
            .unwrap();
        assert!(out.starts_with("OpenAI response for gpt:"));
        assert!(out.contains("Hello, how are you?"));
    }

    #[test]
    fn long_prompts_are_truncated() {
        let provider = OpenAiProvider::new();
        let long = "x".repeat(200);
        let out = provider.invoke("gpt", &long, &ProviderParams::new()).unwrap();
        assert!(out.len() < 200);
        assert!(out.ends_with("..."));
    }
}
