//! # reapcache
//!
//! A time-bounded, concurrency-safe key-value cache with automatic background
//! expiry.
//!
//! ## Features
//!
//! - One TTL applied uniformly to every entry
//! - Background reaper sweeping expired entries on a fixed interval
//! - Synchronous `add`/`get`, safe to call from any number of threads
//! - Explicit lifecycle: `close`, `shutdown`, or drop stops the reaper
//! - Fetch-through helper for "check cache, else fetch and store" callers
//! - A small command loop for poking at a cache interactively
//!
//! ## Example
//!
//! ```no_run
//! use reapcache::ReapingCache;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = ReapingCache::new(Duration::from_secs(5));
//!
//!     cache.add("test", b"value".to_vec());
//!     assert_eq!(cache.get("test"), Some(b"value".to_vec()));
//!
//!     cache.shutdown().await;
//! }
//! ```
//!
//! ## Fetch-through
//!
//! ```no_run
//! use reapcache::{fetch_with_cache, CacheKeyBuilder, ReapingCache};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cache = ReapingCache::new(Duration::from_secs(300));
//!     let key = CacheKeyBuilder::new("location-area").param("offset", 20).build();
//!
//!     let fetched = fetch_with_cache(&cache, &key, || async {
//!         Ok::<_, anyhow::Error>(b"{\"results\": []}".to_vec())
//!     })
//!     .await?;
//!
//!     println!("{} bytes (cached: {})", fetched.value.len(), fetched.from_cache);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod fetch;
pub mod repl;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheEntry, CacheKey, CacheStats, CacheValue, ReapingCache,
};
pub use error::{CacheError, Result};
pub use fetch::{fetch_with_cache, CacheKeyBuilder, Fetched};
pub use repl::{parse_line, Command, Repl, ReplOutcome};
