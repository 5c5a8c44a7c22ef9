//! Fetch-through helpers
//!
//! Callers key entries by whatever identifies the fetch target and store the
//! raw payload; decoding stays with them.

use crate::cache::{CacheKey, CacheValue, ReapingCache};
use std::future::Future;
use tracing::debug;

/// Payload returned by [`fetch_with_cache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// Raw payload bytes
    pub value: CacheValue,

    /// True when served from the cache without calling the fetcher
    pub from_cache: bool,
}

/// Return the cached payload for `key`, or run `fetch` and cache its result.
///
/// A failed fetch is returned as-is and leaves the cache untouched.
pub async fn fetch_with_cache<F, Fut, E>(
    cache: &ReapingCache,
    key: &str,
    fetch: F,
) -> std::result::Result<Fetched, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<CacheValue, E>>,
{
    if let Some(value) = cache.get(key) {
        debug!("Serving {} from cache", key);
        return Ok(Fetched {
            value,
            from_cache: true,
        });
    }

    let value = fetch().await?;
    cache.add(key, value.clone());

    Ok(Fetched {
        value,
        from_cache: false,
    })
}

/// Builder for resource-style cache keys: `resource/identifier?k=v&k2=v2`
pub struct CacheKeyBuilder {
    resource: String,
    identifier: Option<String>,
    params: Vec<(String, String)>,
}

impl CacheKeyBuilder {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            identifier: None,
            params: Vec::new(),
        }
    }

    /// Set the resource identifier
    pub fn identifier(mut self, id: impl Into<String>) -> Self {
        self.identifier = Some(id.into());
        self
    }

    /// Append a query parameter (kept in insertion order)
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Build the cache key
    pub fn build(self) -> CacheKey {
        let mut key = self.resource;

        if let Some(id) = self.identifier {
            key.push('/');
            key.push_str(&id);
        }

        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            key.push('?');
            key.push_str(&params.join("&"));
        }

        key
    }
}
