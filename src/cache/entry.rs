//! Cache entry with creation timestamp

use crate::cache::types::CacheValue;
use std::time::Duration;
use tokio::time::Instant;

/// A cached payload together with the instant it was inserted.
///
/// Entries are immutable: overwriting a key replaces the whole entry, so
/// `created_at` is only ever set here.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    value: CacheValue,
    created_at: Instant,
}

impl CacheEntry {
    /// Create an entry stamped with the current instant
    pub fn new(value: CacheValue) -> Self {
        Self::with_created_at(value, Instant::now())
    }

    pub(crate) fn with_created_at(value: CacheValue, created_at: Instant) -> Self {
        Self { value, created_at }
    }

    /// The cached bytes
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Age of the entry relative to `now`
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Check whether the entry has outlived `ttl` at `now`.
    ///
    /// Strictly older than the TTL; an entry exactly `ttl` old is kept.
    pub fn is_expired_at(&self, ttl: Duration, now: Instant) -> bool {
        self.age_at(now) > ttl
    }
}
