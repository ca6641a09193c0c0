//! Grouped cache with relation-map invalidation
//!
//! One [`CacheProvider`] is shared by every service. Each entry belongs to
//! the group of its owning entity type; writes evict the group and cascade
//! to dependent groups through the configured relation map.

pub mod provider;
pub mod sweeper;

pub use provider::{CacheError, CacheProvider, CacheStats, CachedValue};
pub use sweeper::spawn_sweeper;
