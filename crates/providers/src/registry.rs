//! Provider registry — maps configured provider ids to backend instances.
//!
//! A model descriptor names a provider id; generation resolves that id
//! here. An id with no registered instance is a fatal configuration error
//! at generation time, surfaced as `ProviderError::Unavailable` by the
//! caller — registration itself never fails.

use std::collections::HashMap;
use std::sync::Arc;

use promptdeck_core::Provider;

use crate::{AnthropicProvider, OpenAiProvider};

/// Maps provider ids to backend instances.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry with the built-in stand-in backends registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(OpenAiProvider::new()));
        registry.register(Arc::new(AnthropicProvider::new()));
        registry
    }

    /// Register a provider under its own id. Replaces any existing
    /// provider with the same id.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    /// Get a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(id).cloned()
    }

    /// List all registered provider ids.
    pub fn ids(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
