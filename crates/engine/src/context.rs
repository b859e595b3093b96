//! Context registry — selection, history, scratch data, and prompt
//! template resolution.

use std::sync::Arc;

use promptdeck_config::{AppConfig, ContextSpec};
use promptdeck_core::{ContextStateSnapshot, ScratchData};

/// Owns the current-context selection, the history of previous selections,
/// and per-context scratch data.
pub struct ContextRegistry {
    config: Arc<AppConfig>,
    current: String,
    history: Vec<String>,
    data: ScratchData,
}

impl ContextRegistry {
    /// Create a registry selecting the configured default context.
    pub fn new(config: Arc<AppConfig>) -> Self {
        let current = config.contexts.default.clone();
        Self {
            config,
            current,
            history: Vec::new(),
            data: ScratchData::new(),
        }
    }

    /// Names of all configured contexts, in config order.
    pub fn available_contexts(&self) -> Vec<String> {
        self.config
            .contexts
            .available
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    /// The currently-selected context name.
    pub fn current_context(&self) -> &str {
        &self.current
    }

    /// Previously-selected contexts, oldest first. The current selection
    /// is not included.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Switch to a different context.
    ///
    /// Returns `false` and leaves all state untouched when `name` is not
    /// configured. On success the *previous* selection is pushed onto the
    /// history, so switching A→B→A leaves a history of `[A, B]`.
    pub fn switch_context(&mut self, name: &str) -> bool {
        if self.config.context(name).is_none() {
            tracing::warn!(context = name, "context not available");
            return false;
        }

        if !self.current.is_empty() {
            self.history.push(self.current.clone());
        }
        self.current = name.to_string();
        tracing::info!(context = name, "switched context");
        true
    }

    /// Descriptor for `name`, or for the current context when `None`.
    /// A miss is `None`, never an error.
    pub fn context_config(&self, name: Option<&str>) -> Option<&ContextSpec> {
        self.config.context(name.unwrap_or(&self.current))
    }

    /// Load the prompt template text for the current context.
    ///
    /// The context's declared template name (or the configured global
    /// default when it declares none) is resolved to `<dir>/<name>.md`.
    /// A missing or unreadable file is a non-fatal miss: the result is an
    /// empty string, not an error.
    pub fn prompt_template(&self) -> String {
        let template = self
            .context_config(None)
            .and_then(|c| c.prompt.clone())
            .unwrap_or_else(|| self.config.prompts.default.clone());

        let path = self.config.prompts.dir.join(format!("{template}.md"));
        match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), reason = %e, "prompt template missing");
                String::new()
            }
        }
    }

    /// Store a value under `key` for the current context. The per-context
    /// bucket is created on first use.
    pub fn add_data(&mut self, key: &str, value: serde_json::Value) {
        self.data
            .entry(self.current.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Fetch the value stored under `key` for the current context.
    pub fn get_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(&self.current).and_then(|bucket| bucket.get(key))
    }

    /// Empty the current context's bucket. The bucket itself stays.
    pub fn clear_data(&mut self) {
        if let Some(bucket) = self.data.get_mut(&self.current) {
            bucket.clear();
        }
    }

    /// Copy out the mutable state for persistence.
    pub fn snapshot(&self) -> ContextStateSnapshot {
        ContextStateSnapshot {
            current: self.current.clone(),
            history: self.history.clone(),
            data: self.data.clone(),
        }
    }

    /// Replace the mutable state wholesale from a snapshot.
    pub fn restore(&mut self, snapshot: ContextStateSnapshot) {
        self.current = snapshot.current;
        self.history = snapshot.history;
        self.data = snapshot.data;
    }
}
