//! Core type definitions for the cache

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - opaque, caller-chosen (request URLs, resource ids)
pub type CacheKey = String;

/// Cache value type - raw payload bytes, parsed by the caller
pub type CacheValue = Vec<u8>;

/// Point-in-time statistics for a cache instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Number of entries currently stored (stale ones included)
    pub entries: usize,

    /// Total number of lookups that found an entry
    pub hits: u64,

    /// Total number of lookups that found nothing
    pub misses: u64,

    /// Entries removed by the reaper since creation
    pub reaped: u64,

    /// Completed reaping sweeps
    pub reap_passes: u64,

    /// Wall-clock time of the last completed sweep
    pub last_reap_at: Option<DateTime<Utc>>,
}

impl CacheStats {
    /// Cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ entries: {}, hits: {}, misses: {}, hit_rate: {:.2}%, reaped: {}, reap_passes: {} }}",
            self.entries,
            self.hits,
            self.misses,
            self.hit_rate(),
            self.reaped,
            self.reap_passes
        )
    }
}
