//! Model registry — backend selection, provider dispatch, response
//! memoization, and metrics.
//!
//! `generate` is the pipeline at the center of the system:
//! cache lookup → provider dispatch → handler post-processing, with the
//! counters updated on every path. Lookup misses during switching are
//! recoverable (`bool` returns); a missing provider at generation time is
//! fatal and propagates after bookkeeping.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use promptdeck_config::{AppConfig, HandlerSpec, ModelSpec};
use promptdeck_core::{
    GenerationError, MetricsCounters, ModelStateSnapshot, ProviderError, ProviderParams,
    ScratchData,
};
use promptdeck_providers::ProviderRegistry;

use crate::cache::{CacheKey, ResponseCache};
use crate::handlers::HandlerRegistry;
use crate::metrics::{MetricsSnapshot, token_estimate};

/// Owns model/handler selection, per-model scratch data, provider and
/// handler dispatch, the memoized response cache, and running metrics.
pub struct ModelRegistry {
    config: Arc<AppConfig>,
    providers: ProviderRegistry,
    handlers: HandlerRegistry,
    current_model: String,
    current_handler: String,
    history: Vec<String>,
    data: ScratchData,
    metrics: MetricsCounters,
    cache: ResponseCache,
}

impl ModelRegistry {
    /// Create a registry selecting the configured default model and
    /// handler, dispatching to the given provider and handler instances.
    pub fn new(
        config: Arc<AppConfig>,
        providers: ProviderRegistry,
        handlers: HandlerRegistry,
    ) -> Self {
        // validation rejects 0; floor at 1 regardless
        let capacity =
            NonZeroUsize::new(config.settings.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let current_model = config.models.default.clone();
        let current_handler = config.handlers.default.clone();
        Self {
            config,
            providers,
            handlers,
            current_model,
            current_handler,
            history: Vec::new(),
            data: ScratchData::new(),
            metrics: MetricsCounters::default(),
            cache: ResponseCache::new(capacity),
        }
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Names of all configured models, in config order.
    pub fn available_models(&self) -> Vec<String> {
        self.config
            .models
            .available
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }

    /// Names of all configured handlers, in config order.
    pub fn available_handlers(&self) -> Vec<String> {
        self.config
            .handlers
            .available
            .iter()
            .map(|h| h.name.clone())
            .collect()
    }

    pub fn current_model(&self) -> &str {
        &self.current_model
    }

    pub fn current_handler(&self) -> &str {
        &self.current_handler
    }

    /// Previously-selected models, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Switch to a different model. Returns `false` and leaves state
    /// untouched when `name` is not configured; otherwise the previous
    /// selection is pushed onto the history.
    pub fn switch_model(&mut self, name: &str) -> bool {
        if self.config.model(name).is_none() {
            tracing::warn!(model = name, "model not available");
            return false;
        }

        if !self.current_model.is_empty() {
            self.history.push(self.current_model.clone());
        }
        self.current_model = name.to_string();
        tracing::info!(model = name, "switched model");
        true
    }

    /// Switch to a different handler. Same rejection semantics as
    /// `switch_model`, but handler switches are not recorded in any
    /// history.
    pub fn switch_handler(&mut self, name: &str) -> bool {
        if self.config.handler(name).is_none() {
            tracing::warn!(handler = name, "handler not available");
            return false;
        }

        self.current_handler = name.to_string();
        tracing::info!(handler = name, "switched handler");
        true
    }

    /// Descriptor for `name`, or for the current model when `None`.
    pub fn model_config(&self, name: Option<&str>) -> Option<&ModelSpec> {
        self.config.model(name.unwrap_or(&self.current_model))
    }

    /// Descriptor for `name`, or for the current handler when `None`.
    pub fn handler_config(&self, name: Option<&str>) -> Option<&HandlerSpec> {
        self.config.handler(name.unwrap_or(&self.current_handler))
    }

    // ── Generation pipeline ───────────────────────────────────────────

    /// Generate a response for `prompt` using the current model and
    /// handler.
    ///
    /// `options` override the model's configured parameters for this call
    /// and take part in the memoization key (canonicalized, so key order
    /// is irrelevant). Every call counts one request and its wall time,
    /// hit or miss, success or failure.
    pub fn generate(
        &mut self,
        prompt: &str,
        options: &ProviderParams,
    ) -> Result<String, GenerationError> {
        self.metrics.requests += 1;
        let started = Instant::now();

        let result = self.generate_inner(prompt, options);

        self.metrics.total_time_secs += started.elapsed().as_secs_f64();
        if let Err(e) = &result {
            self.metrics.errors += 1;
            tracing::error!(model = %self.current_model, error = %e, "generation failed");
        }
        result
    }

    fn generate_inner(
        &mut self,
        prompt: &str,
        options: &ProviderParams,
    ) -> Result<String, GenerationError> {
        let raw = if self.config.settings.cache_enabled {
            let key = CacheKey::new(&self.current_model, prompt, options);
            match self.cache.get(&key) {
                Some(hit) => {
                    self.metrics.cache_hits += 1;
                    tracing::debug!(model = %self.current_model, "response cache hit");
                    hit
                }
                None => {
                    self.metrics.cache_misses += 1;
                    let raw = self.raw_generate(prompt, options)?;
                    self.cache.put(key, raw.clone());
                    raw
                }
            }
        } else {
            self.raw_generate(prompt, options)?
        };

        // Post-processing is applied after the cache: only raw provider
        // output is memoized. An unregistered handler name passes through.
        Ok(match self.handlers.get(&self.current_handler) {
            Some(handler) => handler.postprocess(&raw),
            None => raw,
        })
    }

    /// Uncached generation: resolve the model descriptor, dispatch to its
    /// provider, merge parameters (caller options win over configured
    /// ones).
    fn raw_generate(
        &mut self,
        prompt: &str,
        options: &ProviderParams,
    ) -> Result<String, GenerationError> {
        let config = Arc::clone(&self.config);
        let spec = config
            .model(&self.current_model)
            .ok_or_else(|| GenerationError::UnknownModel(self.current_model.clone()))?;

        let provider = self
            .providers
            .get(&spec.provider)
            .ok_or_else(|| ProviderError::Unavailable(spec.provider.clone()))?;

        let mut params = spec.params.clone();
        params.extend(options.iter().map(|(k, v)| (k.clone(), v.clone())));

        let response = provider.invoke(&spec.name, prompt, &params)?;
        self.metrics.total_tokens += token_estimate(prompt) + token_estimate(&response);
        Ok(response)
    }

    // ── Scratch data ──────────────────────────────────────────────────

    /// Store a value under `key` for the current model.
    pub fn add_data(&mut self, key: &str, value: serde_json::Value) {
        self.data
            .entry(self.current_model.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Fetch the value stored under `key` for the current model.
    pub fn get_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.data
            .get(&self.current_model)
            .and_then(|bucket| bucket.get(key))
    }

    /// Empty the current model's bucket. The bucket itself stays.
    pub fn clear_data(&mut self) {
        if let Some(bucket) = self.data.get_mut(&self.current_model) {
            bucket.clear();
        }
    }

    // ── Metrics & persistence ─────────────────────────────────────────

    /// Derived metrics snapshot. Pure — never mutates the counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::from_counters(&self.metrics)
    }

    /// Number of memoized responses currently held.
    pub fn cached_responses(&self) -> usize {
        self.cache.len()
    }

    /// Copy out the mutable state for persistence. The response cache is
    /// process-local and not part of the snapshot.
    pub fn snapshot(&self) -> ModelStateSnapshot {
        ModelStateSnapshot {
            current_model: self.current_model.clone(),
            current_handler: self.current_handler.clone(),
            history: self.history.clone(),
            data: self.data.clone(),
            metrics: self.metrics.clone(),
        }
    }

    /// Replace the mutable state wholesale from a snapshot.
    pub fn restore(&mut self, snapshot: ModelStateSnapshot) {
        self.current_model = snapshot.current_model;
        self.current_handler = snapshot.current_handler;
        self.history = snapshot.history;
        self.data = snapshot.data;
        self.metrics = snapshot.metrics;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Counts invocations and records the params it last saw.
    struct CountingProvider {
        id: String,
        calls: Mutex<usize>,
        last_params: Mutex<Option<ProviderParams>>,
        fail: bool,
    }

    impl CountingProvider {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.into(),
                calls: Mutex::new(0),
                last_params: Mutex::new(None),
                fail: false,
            })
        }

        fn failing(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.into(),
                calls: Mutex::new(0),
                last_params: Mutex::new(None),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl promptdeck_core::Provider for CountingProvider {
        fn id(&self) -> &str {
            &self.id
        }

        fn invoke(
            &self,
            model: &str,
            prompt: &str,
            params: &ProviderParams,
        ) -> Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            *self.last_params.lock().unwrap() = Some(params.clone());
            if self.fail {
                return Err(ProviderError::Invoke {
                    provider: self.id.clone(),
                    reason: "scripted failure".into(),
                });
            }
            Ok(format!("{model} says: {prompt}"))
        }
    }

    fn registry_with(provider: Arc<CountingProvider>, cache_enabled: bool) -> ModelRegistry {
        let mut config = AppConfig::default();
        config.settings.cache_enabled = cache_enabled;
        config.models.available[0].provider = provider.id.clone();
        let mut providers = ProviderRegistry::new();
        providers.register(provider);
        ModelRegistry::new(Arc::new(config), providers, HandlerRegistry::builtin())
    }

    #[test]
    fn starts_on_configured_defaults() {
        let models = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        assert_eq!(models.current_model(), "gpt");
        assert_eq!(models.current_handler(), "basic");
        assert!(models.history().is_empty());
    }

    #[test]
    fn switch_model_pushes_previous_onto_history() {
        let mut models = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        assert!(models.switch_model("claude"));
        assert!(models.switch_model("gpt"));
        assert_eq!(models.history(), ["gpt", "claude"]);
    }

    #[test]
    fn switch_model_rejects_unknown_name() {
        let mut models = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        assert!(!models.switch_model("nonexistent"));
        assert_eq!(models.current_model(), "gpt");
        assert!(models.history().is_empty());
    }

    #[test]
    fn switch_handler_leaves_no_history() {
        let mut models = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        assert!(models.switch_handler("chain"));
        assert!(models.switch_handler("basic"));
        assert_eq!(models.current_handler(), "basic");
        assert!(models.history().is_empty());

        assert!(!models.switch_handler("ghost"));
        assert_eq!(models.current_handler(), "basic");
    }

    #[test]
    fn identical_requests_hit_the_cache() {
        let provider = CountingProvider::new("mock");
        let mut models = registry_with(Arc::clone(&provider), true);

        let first = models.generate("2+2?", &ProviderParams::new()).unwrap();
        let second = models.generate("2+2?", &ProviderParams::new()).unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
        let m = models.metrics();
        assert_eq!(m.requests, 2);
        assert_eq!(m.cache_hits, 1);
        assert_eq!(m.cache_misses, 1);
    }

    #[test]
    fn option_key_order_does_not_defeat_the_cache() {
        let provider = CountingProvider::new("mock");
        let mut models = registry_with(Arc::clone(&provider), true);

        let mut a = ProviderParams::new();
        a.insert("temperature".into(), serde_json::json!(0.1));
        a.insert("max_tokens".into(), serde_json::json!(10));
        let mut b = ProviderParams::new();
        b.insert("max_tokens".into(), serde_json::json!(10));
        b.insert("temperature".into(), serde_json::json!(0.1));

        models.generate("hi", &a).unwrap();
        models.generate("hi", &b).unwrap();
        assert_eq!(provider.calls(), 1);
        assert_eq!(models.metrics().cache_hits, 1);
    }

    #[test]
    fn disabled_cache_always_invokes_the_provider() {
        let provider = CountingProvider::new("mock");
        let mut models = registry_with(Arc::clone(&provider), false);

        models.generate("2+2?", &ProviderParams::new()).unwrap();
        models.generate("2+2?", &ProviderParams::new()).unwrap();

        assert_eq!(provider.calls(), 2);
        let m = models.metrics();
        assert_eq!(m.cache_hits, 0);
        assert_eq!(m.cache_misses, 0);
        assert_eq!(m.requests, 2);
    }

    #[test]
    fn caller_options_override_configured_params() {
        let provider = CountingProvider::new("mock");
        let mut models = registry_with(Arc::clone(&provider), true);

        let mut options = ProviderParams::new();
        options.insert("temperature".into(), serde_json::json!(0.0));
        models.generate("hi", &options).unwrap();

        let seen = provider.last_params.lock().unwrap().clone().unwrap();
        // config default for gpt is temperature 0.7; the caller wins
        assert_eq!(seen["temperature"], serde_json::json!(0.0));
    }

    #[test]
    fn unregistered_provider_is_fatal() {
        let mut config = AppConfig::default();
        config.models.available[0].provider = "azure".into();
        let mut models = ModelRegistry::new(
            Arc::new(config),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );

        let err = models.generate("hi", &ProviderParams::new()).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::Provider(ProviderError::Unavailable(ref id)) if id == "azure"
        ));
        let m = models.metrics();
        assert_eq!(m.errors, 1);
        assert_eq!(m.requests, 1);
    }

    #[test]
    fn provider_failures_propagate_and_count() {
        let provider = CountingProvider::failing("mock");
        let mut models = registry_with(Arc::clone(&provider), true);

        assert!(models.generate("a", &ProviderParams::new()).is_err());
        assert!(models.generate("b", &ProviderParams::new()).is_err());
        models.switch_handler("chain");
        // a third call that also fails — handler choice is irrelevant
        assert!(models.generate("c", &ProviderParams::new()).is_err());

        let m = models.metrics();
        assert_eq!(m.requests, 3);
        assert_eq!(m.errors, 3);
        assert_eq!(m.error_rate, 1.0);
        // failed generations are never cached
        assert_eq!(models.cached_responses(), 0);
    }

    #[test]
    fn handler_output_is_never_cached() {
        let provider = CountingProvider::new("mock");
        let mut models = registry_with(Arc::clone(&provider), true);

        let plain = models.generate("2+2?", &ProviderParams::new()).unwrap();
        models.switch_handler("chain");
        let chained = models.generate("2+2?", &ProviderParams::new()).unwrap();

        assert_eq!(provider.calls(), 1);
        assert_eq!(chained, format!("Chain of thought: {plain}"));
    }

    #[test]
    fn unregistered_handler_passes_through() {
        let provider = CountingProvider::new("mock");
        let mut config = AppConfig::default();
        config.models.available[0].provider = "mock".into();
        config
            .handlers
            .available
            .push(promptdeck_config::HandlerSpec {
                name: "custom".into(),
            });
        let mut providers = ProviderRegistry::new();
        providers.register(Arc::clone(&provider) as Arc<dyn promptdeck_core::Provider>);
        let mut models =
            ModelRegistry::new(Arc::new(config), providers, HandlerRegistry::builtin());

        assert!(models.switch_handler("custom"));
        let out = models.generate("hi", &ProviderParams::new()).unwrap();
        assert_eq!(out, "gpt says: hi");
    }

    #[test]
    fn data_is_scoped_to_current_model() {
        let mut models = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        models.add_data("notes", serde_json::json!("fast"));
        models.switch_model("claude");
        assert!(models.get_data("notes").is_none());
        models.switch_model("gpt");
        assert_eq!(models.get_data("notes"), Some(&serde_json::json!("fast")));

        models.clear_data();
        assert!(models.get_data("notes").is_none());
    }

    #[test]
    fn generation_records_time_and_tokens() {
        let provider = CountingProvider::new("mock");
        let mut models = registry_with(provider, true);
        models.generate("one two three", &ProviderParams::new()).unwrap();

        let m = models.metrics();
        assert!(m.total_time_secs >= 0.0);
        assert!(m.total_tokens > 0);
        assert_eq!(m.average_time_secs, m.total_time_secs);
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut models = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        models.switch_model("claude");
        models.switch_handler("tree");
        models.add_data("k", serde_json::json!(true));

        let snapshot = models.snapshot();
        let mut fresh = ModelRegistry::new(
            Arc::new(AppConfig::default()),
            ProviderRegistry::builtin(),
            HandlerRegistry::builtin(),
        );
        fresh.restore(snapshot.clone());
        assert_eq!(fresh.current_model(), "claude");
        assert_eq!(fresh.current_handler(), "tree");
        assert_eq!(fresh.snapshot(), snapshot);
    }
}
