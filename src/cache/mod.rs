//! # Reaping TTL Cache
//!
//! An in-memory key-value cache where every entry carries its insertion time
//! and a background task deletes entries once they outlive a single,
//! cache-wide TTL.
//!
//! ## Consistency
//!
//! Lookups never check freshness; expiry is entirely the reaper's job. An
//! entry older than the TTL remains visible until the next sweep, so it can be
//! observed for at most one reap interval past its TTL.
//!
//! ## Example
//!
//! ```rust
//! use reapcache::cache::{CacheConfig, ReapingCache};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let config = CacheConfig::builder()
//!     .ttl(Duration::from_secs(300))
//!     .reap_interval(Duration::from_secs(30))
//!     .build();
//!
//! let cache = ReapingCache::with_config(config);
//!
//! cache.add("https://pokeapi.co/api/v2/location-area/", b"{}".to_vec());
//!
//! if let Some(body) = cache.get("https://pokeapi.co/api/v2/location-area/") {
//!     println!("Cache hit: {} bytes", body.len());
//! }
//!
//! cache.shutdown().await;
//! # }
//! ```

pub mod config;
pub mod entry;
mod reaper;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use store::ReapingCache;
pub use types::{CacheKey, CacheStats, CacheValue};
