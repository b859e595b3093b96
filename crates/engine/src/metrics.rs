//! Derived metrics reporting for the generation pipeline.

use promptdeck_core::MetricsCounters;
use serde::Serialize;

/// A point-in-time view of the pipeline counters plus derived rates.
/// Producing one never mutates the underlying counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_tokens: u64,
    pub total_time_secs: f64,

    /// `total_time / max(1, requests)`
    pub average_time_secs: f64,
    /// `errors / max(1, requests)`
    pub error_rate: f64,
    /// `cache_hits / max(1, cache_hits + cache_misses)`
    pub cache_hit_rate: f64,
}

impl MetricsSnapshot {
    pub fn from_counters(c: &MetricsCounters) -> Self {
        Self {
            requests: c.requests,
            errors: c.errors,
            cache_hits: c.cache_hits,
            cache_misses: c.cache_misses,
            total_tokens: c.total_tokens,
            total_time_secs: c.total_time_secs,
            average_time_secs: c.total_time_secs / c.requests.max(1) as f64,
            error_rate: c.errors as f64 / c.requests.max(1) as f64,
            cache_hit_rate: c.cache_hits as f64
                / (c.cache_hits + c.cache_misses).max(1) as f64,
        }
    }
}

/// Whitespace-token count — a deliberately rough stand-in for real token
/// accounting, which is out of scope.
pub(crate) fn token_estimate(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counters_produce_zero_rates() {
        let snapshot = MetricsSnapshot::from_counters(&MetricsCounters::default());
        assert_eq!(snapshot.average_time_secs, 0.0);
        assert_eq!(snapshot.error_rate, 0.0);
        assert_eq!(snapshot.cache_hit_rate, 0.0);
    }

    #[test]
    fn derived_rates() {
        let counters = MetricsCounters {
            requests: 4,
            errors: 1,
            cache_hits: 3,
            cache_misses: 1,
            total_tokens: 100,
            total_time_secs: 2.0,
        };
        let snapshot = MetricsSnapshot::from_counters(&counters);
        assert_eq!(snapshot.average_time_secs, 0.5);
        assert_eq!(snapshot.error_rate, 0.25);
        assert_eq!(snapshot.cache_hit_rate, 0.75);
    }

    #[test]
    fn token_estimate_counts_whitespace_words() {
        assert_eq!(token_estimate(""), 0);
        assert_eq!(token_estimate("one two  three\nfour"), 4);
    }
}
