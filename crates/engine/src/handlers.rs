//! Built-in response handlers and their registry.
//!
//! A handler reframes raw provider output. The built-ins mirror the
//! configured strategies: a pass-through, chain-of-thought and
//! tree-of-thoughts prefixing, and agent framing. Configured handler names
//! with no registered instance degrade to the identity transform at
//! generation time.

use std::collections::HashMap;
use std::sync::Arc;

use promptdeck_core::Handler;

/// Direct pass-through.
#[derive(Debug, Default)]
pub struct BasicHandler;

impl Handler for BasicHandler {
    fn name(&self) -> &str {
        "basic"
    }

    fn postprocess(&self, response: &str) -> String {
        response.to_string()
    }
}

/// Chain-of-thought framing.
#[derive(Debug, Default)]
pub struct ChainOfThoughtHandler;

impl Handler for ChainOfThoughtHandler {
    fn name(&self) -> &str {
        "chain"
    }

    fn postprocess(&self, response: &str) -> String {
        format!("Chain of thought: {response}")
    }
}

/// Tree-of-thoughts framing.
#[derive(Debug, Default)]
pub struct TreeOfThoughtsHandler;

impl Handler for TreeOfThoughtsHandler {
    fn name(&self) -> &str {
        "tree"
    }

    fn postprocess(&self, response: &str) -> String {
        format!("Tree of thoughts: {response}")
    }
}

/// Autonomous-agent framing.
#[derive(Debug, Default)]
pub struct AgentHandler;

impl Handler for AgentHandler {
    fn name(&self) -> &str {
        "agent"
    }

    fn postprocess(&self, response: &str) -> String {
        format!("Agent response: {response}")
    }
}

/// Maps handler names to strategy instances.
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with the four built-in strategies registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(BasicHandler));
        registry.register(Arc::new(ChainOfThoughtHandler));
        registry.register(Arc::new(TreeOfThoughtsHandler));
        registry.register(Arc::new(AgentHandler));
        registry
    }

    /// Register a handler under its own name. Replaces any existing
    /// handler with the same name.
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    /// Get a handler by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).cloned()
    }

    /// List all registered handler names.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_is_identity() {
        assert_eq!(BasicHandler.postprocess("4"), "4");
    }

    #[test]
    fn framing_handlers_prefix_the_response() {
        assert_eq!(
            ChainOfThoughtHandler.postprocess("4"),
            "Chain of thought: 4"
        );
        assert_eq!(
            TreeOfThoughtsHandler.postprocess("4"),
            "Tree of thoughts: 4"
        );
        assert_eq!(AgentHandler.postprocess("4"), "Agent response: 4");
    }

    #[test]
    fn builtin_registers_all_strategies() {
        let registry = HandlerRegistry::builtin();
        for name in ["basic", "chain", "tree", "agent"] {
            assert!(registry.get(name).is_some(), "missing handler {name}");
        }
        assert!(registry.get("ghost").is_none());
    }
}
