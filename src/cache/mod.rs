//! Cache Module
//!
//! Response cache keyed by request fingerprint, with lazy TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::CacheStats;
pub use store::ResponseCache;

// == Public Constants ==
/// TTL applied by `ResponseCache::set` when the caller gives none (15 minutes)
pub const DEFAULT_CACHE_TTL_MS: u64 = 15 * 60 * 1000;
