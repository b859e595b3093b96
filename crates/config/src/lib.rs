//! Configuration loading, validation, and management for Promptdeck.
//!
//! Loads configuration from a YAML file (default `config/promptdeck.yaml`)
//! and validates it at startup. The configuration is read-only after load:
//! registries receive it by shared ownership and never write back.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The root configuration structure.
///
/// Maps directly to the YAML config file:
///
/// ```yaml
/// contexts:
///   default: default
///   available:
///     - name: coding
///       prompt: coding
/// models:
///   default: gpt
///   available:
///     - name: gpt
///       provider: openai
///       temperature: 0.7
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Available contexts and the initially-selected one
    #[serde(default)]
    pub contexts: ContextsConfig,

    /// Available models and the initially-selected one
    #[serde(default)]
    pub models: ModelsConfig,

    /// Available response handlers and the initially-selected one
    #[serde(default)]
    pub handlers: HandlersConfig,

    /// Prompt template resolution
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Runtime settings (caching, logging)
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextsConfig {
    #[serde(default = "default_context_name")]
    pub default: String,

    #[serde(default = "default_contexts")]
    pub available: Vec<ContextSpec>,
}

/// A named conversational stance: a prompt template reference plus a home
/// for scratch key/value data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSpec {
    pub name: String,

    /// Template name under `prompts.dir`; falls back to `prompts.default`
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

fn default_context_name() -> String {
    "default".into()
}

fn default_contexts() -> Vec<ContextSpec> {
    vec![
        ContextSpec {
            name: "default".into(),
            prompt: None,
        },
        ContextSpec {
            name: "coding".into(),
            prompt: Some("coding".into()),
        },
    ]
}

impl Default for ContextsConfig {
    fn default() -> Self {
        Self {
            default: default_context_name(),
            available: default_contexts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_model_name")]
    pub default: String,

    #[serde(default = "default_models")]
    pub available: Vec<ModelSpec>,
}

/// A named backend configuration: which provider answers for this model,
/// plus provider-specific parameters (temperature, max_tokens, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,

    /// Provider id this model dispatches to (e.g. "openai", "anthropic").
    pub provider: String,

    /// Provider-specific parameters, kept ordered so serialization is
    /// stable.
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_json::Value>,
}

fn default_model_name() -> String {
    "gpt".into()
}

fn default_models() -> Vec<ModelSpec> {
    vec![
        ModelSpec {
            name: "gpt".into(),
            provider: "openai".into(),
            params: BTreeMap::from([("temperature".into(), serde_json::json!(0.7))]),
        },
        ModelSpec {
            name: "claude".into(),
            provider: "anthropic".into(),
            params: BTreeMap::from([("temperature".into(), serde_json::json!(0.5))]),
        },
    ]
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            default: default_model_name(),
            available: default_models(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlersConfig {
    #[serde(default = "default_handler_name")]
    pub default: String,

    #[serde(default = "default_handlers")]
    pub available: Vec<HandlerSpec>,
}

/// A named post-processing strategy applied to raw model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerSpec {
    pub name: String,
}

fn default_handler_name() -> String {
    "basic".into()
}

fn default_handlers() -> Vec<HandlerSpec> {
    ["basic", "chain", "tree", "agent"]
        .into_iter()
        .map(|name| HandlerSpec { name: name.into() })
        .collect()
}

impl Default for HandlersConfig {
    fn default() -> Self {
        Self {
            default: default_handler_name(),
            available: default_handlers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Template used by contexts that declare none of their own.
    #[serde(default = "default_prompt_name")]
    pub default: String,

    /// Directory holding `<template>.md` files.
    #[serde(default = "default_prompt_dir")]
    pub dir: PathBuf,
}

fn default_prompt_name() -> String {
    "default".into()
}

fn default_prompt_dir() -> PathBuf {
    PathBuf::from("prompts")
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            default: default_prompt_name(),
            dir: default_prompt_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Memoize raw provider responses
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Response cache capacity; the least-recently-used entry is evicted
    /// once full
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Default log level when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_capacity: default_cache_capacity(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a specific file path.
    ///
    /// A missing file yields the default configuration; a present but
    /// malformed or invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_section(
            "contexts",
            &self.contexts.default,
            self.contexts.available.iter().map(|c| c.name.as_str()),
        )?;
        validate_section(
            "models",
            &self.models.default,
            self.models.available.iter().map(|m| m.name.as_str()),
        )?;
        validate_section(
            "handlers",
            &self.handlers.default,
            self.handlers.available.iter().map(|h| h.name.as_str()),
        )?;

        for model in &self.models.available {
            if model.provider.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "models.available[{}].provider must not be empty",
                    model.name
                )));
            }
        }

        for context in &self.contexts.available {
            if let Some(prompt) = &context.prompt {
                if prompt.trim().is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "contexts.available[{}].prompt must not be empty when given",
                        context.name
                    )));
                }
            }
        }

        if self.settings.cache_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "settings.cache_capacity must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Look up a model descriptor by name.
    pub fn model(&self, name: &str) -> Option<&ModelSpec> {
        self.models.available.iter().find(|m| m.name == name)
    }

    /// Look up a context descriptor by name.
    pub fn context(&self, name: &str) -> Option<&ContextSpec> {
        self.contexts.available.iter().find(|c| c.name == name)
    }

    /// Look up a handler descriptor by name.
    pub fn handler(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers.available.iter().find(|h| h.name == name)
    }

    /// Generate a default config YAML string (for scaffolding a new setup).
    pub fn default_yaml() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            contexts: ContextsConfig::default(),
            models: ModelsConfig::default(),
            handlers: HandlersConfig::default(),
            prompts: PromptsConfig::default(),
            settings: Settings::default(),
        }
    }
}

/// Shared checks for the contexts/models/handlers sections: names must be
/// non-empty and unique, and the configured default must exist.
fn validate_section<'a>(
    section: &str,
    default: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{section}.available[].name must not be empty"
            )));
        }
        if !seen.insert(name) {
            return Err(ConfigError::ValidationError(format!(
                "{section}.available has duplicate name '{name}'"
            )));
        }
    }
    if !seen.contains(default) {
        return Err(ConfigError::ValidationError(format!(
            "{section}.default '{default}' not found in {section}.available"
        )));
    }
    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
