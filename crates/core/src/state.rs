//! Serializable state types: interaction records, registry snapshots, and
//! the persisted state document.
//!
//! Every field of the persisted document carries a serde default so that a
//! partially-written or older document still deserializes; shape errors are
//! the importer's signal to reject the whole document.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-name scratch data: owner name → key/value bucket.
pub type ScratchData = HashMap<String, HashMap<String, serde_json::Value>>;

/// A single prompt/response exchange, appended to the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Context that was active when the exchange happened.
    pub context: String,
    /// Model that produced the response.
    pub model: String,
    /// The user's prompt (without the context template).
    pub prompt: String,
    /// The post-processed response text.
    pub response: String,
}

/// Snapshot of the context registry's mutable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextStateSnapshot {
    #[serde(default)]
    pub current: String,

    /// Previously-active contexts, oldest first. The currently-active
    /// context is *not* in here.
    #[serde(default)]
    pub history: Vec<String>,

    #[serde(default)]
    pub data: ScratchData,
}

/// Snapshot of the model registry's mutable state.
///
/// The response cache is deliberately absent: memoization is process-local
/// and rebuilt from scratch after an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelStateSnapshot {
    #[serde(default)]
    pub current_model: String,

    #[serde(default)]
    pub current_handler: String,

    /// Previously-active models, oldest first. Handler switches leave no
    /// trace here.
    #[serde(default)]
    pub history: Vec<String>,

    #[serde(default)]
    pub data: ScratchData,

    #[serde(default)]
    pub metrics: MetricsCounters,
}

/// Raw running counters for the generation pipeline.
///
/// `total_tokens` is a rough whitespace-token estimate of what crossed the
/// provider boundary, not an accurate accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsCounters {
    #[serde(default)]
    pub requests: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub cache_hits: u64,
    #[serde(default)]
    pub cache_misses: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_time_secs: f64,
}

/// The full persisted state tree: both registries plus the interaction log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub context: ContextStateSnapshot,

    #[serde(default)]
    pub model: ModelStateSnapshot,

    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
}
