//! Response Cache Module
//!
//! Fingerprint-keyed map of response payloads with lazy TTL expiration.
//! There is no size bound and no background sweep: a stale entry stays in
//! the map until the next lookup for its key finds it expired.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, DEFAULT_CACHE_TTL_MS};
use crate::error::{MarketError, Result};

// == Response Cache ==
/// Response cache keyed by request fingerprint.
#[derive(Debug)]
pub struct ResponseCache {
    /// Fingerprint to entry storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied when `set` is called without one
    default_ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_CACHE_TTL_MS))
    }
}

impl ResponseCache {
    // == Constructor ==
    /// Creates an empty cache using `default_ttl` for entries set without a TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a payload under `key`, replacing any existing entry.
    ///
    /// The new entry expires `ttl` (or the default TTL) from now. A zero TTL
    /// is rejected since the entry could never be read back.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) -> Result<()> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if ttl.is_zero() {
            return Err(MarketError::InvalidRequest(
                "Cache TTL must be greater than zero".to_string(),
            ));
        }

        let key = key.into();
        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache set");
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the payload for `key` if present and not expired.
    ///
    /// A stale entry is removed from the map and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                debug!(key = %key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_total_entries(self.entries.len());
                debug!(key = %key, "cache entry expired");
                None
            }
            None => {
                self.stats.record_miss();
                debug!(key = %key, "cache miss");
                None
            }
        }
    }

    /// Whether `key` currently occupies a slot, stale or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Drops every entry; statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
