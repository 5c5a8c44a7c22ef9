//! Configuration for the reaping cache

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the TTL, in (fractional) seconds
pub const TTL_ENV: &str = "REAPCACHE_TTL_SECS";

/// Environment variable overriding the reap interval, in (fractional) seconds
pub const REAP_INTERVAL_ENV: &str = "REAPCACHE_REAP_INTERVAL_SECS";

/// Default time-to-live: 5 minutes
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Floor applied to the reap interval when scheduling the reaper
pub const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a [`ReapingCache`](crate::cache::ReapingCache)
///
/// `ttl` is the expiry horizon shared by every entry. `reap_interval` is the
/// period of the background sweep; an expired entry stays visible for at most
/// one extra interval after its TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live applied uniformly to all entries
    pub ttl: Duration,

    /// Period of the background reaping sweep
    pub reap_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl CacheConfig {
    /// Configuration whose reap interval equals the TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            reap_interval: ttl,
        }
    }

    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate a configuration coming from a user-facing surface.
    ///
    /// The cache itself accepts degenerate durations; this check is for
    /// values read from the environment or the command line.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "ttl must be greater than zero".to_string(),
            ));
        }

        if self.reap_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "reap_interval must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Reap interval as actually scheduled (never below [`MIN_REAP_INTERVAL`])
    pub fn effective_reap_interval(&self) -> Duration {
        self.reap_interval.max(MIN_REAP_INTERVAL)
    }

    /// Load configuration from the process environment.
    ///
    /// Reads [`TTL_ENV`] and [`REAP_INTERVAL_ENV`]; unset variables fall back
    /// to the defaults, and an unset reap interval follows the TTL.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(ttl) = parse_secs(TTL_ENV, lookup(TTL_ENV))? {
            builder = builder.ttl(ttl);
        }
        if let Some(interval) = parse_secs(REAP_INTERVAL_ENV, lookup(REAP_INTERVAL_ENV))? {
            builder = builder.reap_interval(interval);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }
}

fn parse_secs(name: &str, raw: Option<String>) -> Result<Option<Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .map(Some)
        .ok_or_else(|| CacheError::EnvVar {
            name: name.to_string(),
            value: raw,
        })
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    ttl: Option<Duration>,
    reap_interval: Option<Duration>,
}

impl CacheConfigBuilder {
    /// Set the time-to-live for cache entries
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set the reaping interval (defaults to the TTL)
    pub fn reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = Some(interval);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let ttl = self.ttl.unwrap_or(DEFAULT_TTL);

        CacheConfig {
            ttl,
            reap_interval: self.reap_interval.unwrap_or(ttl),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.reap_interval, config.ttl);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_interval_follows_ttl() {
        let config = CacheConfig::builder()
            .ttl(Duration::from_secs(5))
            .build();
        assert_eq!(config.reap_interval, Duration::from_secs(5));

        let config = CacheConfig::builder()
            .ttl(Duration::from_secs(5))
            .reap_interval(Duration::from_millis(250))
            .build();
        assert_eq!(config.ttl, Duration::from_secs(5));
        assert_eq!(config.reap_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_config_validation() {
        assert!(CacheConfig::new(Duration::ZERO).validate().is_err());

        let config = CacheConfig::builder()
            .ttl(Duration::from_secs(1))
            .reap_interval(Duration::ZERO)
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reap_interval"));
    }

    #[test]
    fn test_effective_reap_interval_is_clamped() {
        let config = CacheConfig::new(Duration::ZERO);
        assert_eq!(config.effective_reap_interval(), MIN_REAP_INTERVAL);

        let config = CacheConfig::new(Duration::from_secs(2));
        assert_eq!(config.effective_reap_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = CacheConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            (TTL_ENV, "2.5"),
            (REAP_INTERVAL_ENV, " 0.5 "),
        ]))
        .unwrap();
        assert_eq!(config.ttl, Duration::from_millis(2500));
        assert_eq!(config.reap_interval, Duration::from_millis(500));

        let config = CacheConfig::from_lookup(lookup_from(&[(TTL_ENV, "10")])).unwrap();
        assert_eq!(config.reap_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = CacheConfig::from_lookup(lookup_from(&[(TTL_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, CacheError::EnvVar { ref name, .. } if name == TTL_ENV));

        let err = CacheConfig::from_lookup(lookup_from(&[(TTL_ENV, "-1")])).unwrap_err();
        assert!(matches!(err, CacheError::EnvVar { .. }));

        let err = CacheConfig::from_lookup(lookup_from(&[(TTL_ENV, "0")])).unwrap_err();
        assert!(matches!(err, CacheError::InvalidConfig(_)));
    }

    #[test]
    fn test_config_serde() {
        let config = CacheConfig::new(Duration::from_secs(30));
        let json = serde_json::to_string(&config).unwrap();
        let back: CacheConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
