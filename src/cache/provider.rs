//! Grouped in-memory cache with relation-map invalidation

use dashmap::DashMap;
use moka::Expiry;
use moka::sync::Cache;
use serde::Serialize;
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::config::CacheConfig;
use crate::core::entity::Entity;
use crate::core::error::CrudError;

/// Type-erased cached value
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// Cache-local failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Key absent or expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key holds a value of another type
    #[error("Cached value under '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

impl From<CacheError> for CrudError {
    fn from(err: CacheError) -> Self {
        CrudError::Internal(err.to_string())
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Keys evicted by invalidation (not by expiry)
    pub invalidations: u64,
    pub entries: usize,
    pub groups: usize,
}

impl CacheStats {
    /// hits / (hits + misses), 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Clone)]
struct Slot {
    value: CachedValue,
    group: Arc<str>,
    /// Explicit lifetime, `None` follows the configured policy
    ttl: Option<Duration>,
}

/// Lifetimes of entries stored with an explicit ttl; each read restarts it
struct ExplicitTtl;

impl Expiry<String, Slot> for ExplicitTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        slot: &Slot,
        _created_at: Instant,
    ) -> Option<Duration> {
        slot.ttl
    }

    fn expire_after_read(
        &self,
        _key: &String,
        slot: &Slot,
        _read_at: Instant,
        _remaining: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        slot.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        slot: &Slot,
        _updated_at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        slot.ttl
    }
}

/// Keys of one group and its invalidation count
#[derive(Debug, Default)]
struct GroupIndex {
    generation: u64,
    keys: HashSet<String>,
}

/// Invalidation state observed before building a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Stamp {
    epoch: u64,
    generation: u64,
}

/// Process-wide cache shared by every service.
///
/// Values live in a `moka` cache with sliding (`ttl`) and absolute
/// (`ttl * 4 / 3`) expiration. Each key belongs to the group of its owning
/// type; writes to a type evict its group and, through the configured
/// relation map, the groups of types whose cached values embed it.
///
/// Every invalidation bumps the group's generation. A value built by
/// [`CacheProvider::get_or_set`] is only stored if its group was not
/// invalidated while it was being built, so a snapshot read before a write
/// never outlives that write.
///
/// ```rust,ignore
/// let cache = Arc::new(CacheProvider::new(CacheConfig::default().relate("Role", "User")));
/// let users = cache
///     .get_or_set("User:all", "User", None, || async { store.list().await })
///     .await?;
/// cache.clear_owner_and_relations("Role"); // evicts Role and User
/// ```
pub struct CacheProvider {
    config: CacheConfig,
    entries: Cache<String, Slot>,
    groups: DashMap<String, GroupIndex>,
    /// Bumped by [`CacheProvider::clear_all`]
    epoch: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl CacheProvider {
    pub fn new(config: CacheConfig) -> Self {
        let ttl = config.ttl();
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_idle(ttl)
            .time_to_live(ttl * 4 / 3)
            .expire_after(ExplicitTtl)
            .build();

        Self {
            config,
            entries,
            groups: DashMap::new(),
            epoch: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn stamp(&self, group: &str) -> Stamp {
        Stamp {
            epoch: self.epoch.load(Ordering::SeqCst),
            generation: self.groups.get(group).map_or(0, |index| index.generation),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Typed lookup; a hit restarts the entry's sliding window
    pub fn try_get<V: Any + Send + Sync>(&self, key: &str) -> Result<Arc<V>, CacheError> {
        let slot = self
            .entries
            .get(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;
        slot.value
            .downcast::<V>()
            .map_err(|_| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<V>(),
            })
    }

    /// Cached value under `key`, `None` on a miss
    pub fn get_cached_value<V: Any + Send + Sync>(&self, key: &str) -> Option<Arc<V>> {
        match self.try_get::<V>(key) {
            Ok(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key, "cache hit");
                Some(value)
            }
            Err(err) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                trace!(key, reason = %err, "cache miss");
                None
            }
        }
    }

    /// Cached value, or build, store and return it.
    ///
    /// Concurrent misses on the same key may both run `builder`; the last
    /// store wins. A failing builder stores nothing, and neither does one
    /// whose group was invalidated before it finished.
    pub async fn get_or_set<V, F, Fut, E>(
        &self,
        key: &str,
        group: &str,
        ttl: Option<Duration>,
        builder: F,
    ) -> Result<Arc<V>, E>
    where
        V: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_cached_value::<V>(key) {
            return Ok(value);
        }
        debug!(key, group, "cache miss, building value");
        let stamp = self.stamp(group);
        let value = Arc::new(builder().await?);
        self.store(key, group, value.clone(), ttl, Some(stamp));
        Ok(value)
    }

    /// Synchronous variant of [`CacheProvider::get_or_set`]
    pub fn get_or_set_sync<V, F, E>(
        &self,
        key: &str,
        group: &str,
        ttl: Option<Duration>,
        builder: F,
    ) -> Result<Arc<V>, E>
    where
        V: Any + Send + Sync,
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get_cached_value::<V>(key) {
            return Ok(value);
        }
        let stamp = self.stamp(group);
        let value = Arc::new(builder()?);
        self.store(key, group, value.clone(), ttl, Some(stamp));
        Ok(value)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Store `value` under `key` in `group`, replacing any previous entry.
    ///
    /// `ttl` can shorten the configured lifetime of this entry, not extend it.
    pub fn set_cached_value<V: Any + Send + Sync>(
        &self,
        key: &str,
        group: &str,
        value: V,
        ttl: Option<Duration>,
    ) {
        self.store(key, group, Arc::new(value), ttl, None);
    }

    /// Insert under the group's lock; with a stamp, only if the group is
    /// unchanged since it was taken
    fn store(
        &self,
        key: &str,
        group: &str,
        value: CachedValue,
        ttl: Option<Duration>,
        stamp: Option<Stamp>,
    ) -> bool {
        let previous = {
            let mut index = self.groups.entry(group.to_string()).or_default();
            if let Some(stamp) = stamp {
                let current = Stamp {
                    epoch: self.epoch.load(Ordering::SeqCst),
                    generation: index.generation,
                };
                if current != stamp {
                    debug!(key, group, "group invalidated while building, value not cached");
                    return false;
                }
            }
            let previous = self.entries.get(key);
            let slot = Slot {
                value,
                group: Arc::from(group),
                ttl,
            };
            self.entries.insert(key.to_string(), slot);
            index.keys.insert(key.to_string());
            previous
        };

        if let Some(previous) = previous.filter(|p| &*p.group != group) {
            if let Some(mut index) = self.groups.get_mut(&*previous.group) {
                index.keys.remove(key);
            }
        }
        trace!(key, group, "cache set");
        true
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    /// Evict one key; returns whether it was cached
    pub fn clear_key(&self, key: &str) -> bool {
        let Some(slot) = self.entries.get(key) else {
            return false;
        };
        let removed = {
            let mut index = self.groups.entry(slot.group.to_string()).or_default();
            index.generation += 1;
            index.keys.remove(key);
            self.entries.remove(key).is_some()
        };
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            debug!(key, "cache key cleared");
        }
        removed
    }

    /// Evict every key of `group`; returns how many were evicted
    pub fn clear_group(&self, group: &str) -> usize {
        let removed = {
            let mut index = self.groups.entry(group.to_string()).or_default();
            index.generation += 1;
            index
                .keys
                .drain()
                .filter(|key| self.entries.remove(key.as_str()).is_some())
                .count()
        };
        self.invalidations
            .fetch_add(removed as u64, Ordering::Relaxed);
        debug!(group, removed, "cache group cleared");
        removed
    }

    /// Groups depending on `owner`, single hop or transitively per config
    pub fn dependents_of(&self, owner: &str) -> Vec<String> {
        let relations = &self.config.relations;
        let Some(direct) = relations.get(owner) else {
            return Vec::new();
        };
        if !self.config.transitive_relations {
            return direct.clone();
        }

        let mut visited: HashSet<&str> = HashSet::from([owner]);
        let mut queue: VecDeque<&str> = direct.iter().map(String::as_str).collect();
        let mut order = Vec::new();
        while let Some(group) = queue.pop_front() {
            if !visited.insert(group) {
                continue;
            }
            order.push(group.to_string());
            if let Some(next) = relations.get(group) {
                queue.extend(next.iter().map(String::as_str));
            }
        }
        order
    }

    /// Evict the groups depending on `owner`
    pub fn clear_relations(&self, owner: &str) -> usize {
        self.dependents_of(owner)
            .iter()
            .map(|group| self.clear_group(group))
            .sum()
    }

    /// Evict `owner`'s group, then the groups depending on it
    pub fn clear_owner_and_relations(&self, owner: &str) -> usize {
        self.clear_group(owner) + self.clear_relations(owner)
    }

    /// Evict everything
    pub fn clear_all(&self) -> usize {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut removed = 0;
        for mut index in self.groups.iter_mut() {
            index.generation += 1;
            removed += index
                .keys
                .drain()
                .filter(|key| self.entries.remove(key.as_str()).is_some())
                .count();
        }
        self.entries.invalidate_all();
        self.invalidations
            .fetch_add(removed as u64, Ordering::Relaxed);
        debug!(removed, "cache cleared");
        removed
    }

    /// Shutdown hook: drop every entry
    pub fn flush(&self) {
        let removed = self.clear_all();
        info!(removed, "cache flushed");
    }

    // =========================================================================
    // Cached list maintenance
    // =========================================================================

    /// Rewrite every cached `Vec<T>` of `group` through `edit`.
    ///
    /// Keys holding anything else are evicted rather than left stale. Values
    /// still being built for the group are not stored afterwards.
    fn edit_cached_lists<T, F>(&self, group: &str, edit: F) -> usize
    where
        T: Entity,
        F: Fn(&mut Vec<T>),
    {
        let Some(mut index) = self.groups.get_mut(group) else {
            return 0;
        };
        index.generation += 1;

        let mut rewritten = 0;
        let mut failed = Vec::new();
        for key in index.keys.iter() {
            let Some(slot) = self.entries.get(key.as_str()) else {
                continue;
            };
            match Arc::clone(&slot.value).downcast::<Vec<T>>() {
                Ok(list) => {
                    let mut list = Vec::clone(&list);
                    edit(&mut list);
                    let value: CachedValue = Arc::new(list);
                    self.entries.insert(key.clone(), Slot { value, ..slot });
                    rewritten += 1;
                }
                Err(_) => {
                    let err = CacheError::TypeMismatch {
                        key: key.clone(),
                        expected: std::any::type_name::<Vec<T>>(),
                    };
                    warn!(error = %err, "cached list update failed, evicting key");
                    failed.push(key.clone());
                }
            }
        }

        for key in &failed {
            index.keys.remove(key);
            self.entries.invalidate(key.as_str());
        }
        self.invalidations
            .fetch_add(failed.len() as u64, Ordering::Relaxed);
        rewritten
    }

    /// Replace `item` (matched by id) inside every cached list of `group`
    pub fn update_item_in_cached_lists<T: Entity>(&self, group: &str, item: &T) -> usize {
        let id = item.id();
        let rewritten = self.edit_cached_lists::<T, _>(group, |list| {
            if let Some(slot) = list.iter_mut().find(|existing| existing.id() == id) {
                *slot = item.clone();
            }
        });
        debug!(group, id, rewritten, "cached lists updated");
        rewritten
    }

    /// Remove the item with `id` from every cached list of `group`, then
    /// evict the groups depending on it
    pub fn delete_from_cached_lists<T: Entity>(&self, group: &str, id: i64) -> usize {
        let rewritten = self.edit_cached_lists::<T, _>(group, |list| {
            list.retain(|existing| existing.id() != id);
        });
        debug!(group, id, rewritten, "item removed from cached lists");
        self.clear_relations(group);
        rewritten
    }

    // =========================================================================
    // Housekeeping
    // =========================================================================

    /// Run the cache's pending maintenance and drop expired keys from the
    /// group index; returns how many keys were dropped
    pub fn purge_expired(&self) -> usize {
        self.entries.run_pending_tasks();
        let mut purged = 0;
        for mut index in self.groups.iter_mut() {
            let before = index.keys.len();
            index.keys.retain(|key| self.entries.contains_key(key.as_str()));
            purged += before - index.keys.len();
        }
        purged
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys currently registered under `group`
    pub fn group_keys(&self, group: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .groups
            .get(group)
            .map(|index| index.keys.iter().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        let (entries, groups) = self.groups.iter().fold((0, 0), |(entries, groups), index| {
            let live = index
                .keys
                .iter()
                .filter(|key| self.entries.contains_key(key.as_str()))
                .count();
            (entries + live, groups + usize::from(live > 0))
        });
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            entries,
            groups,
        }
    }
}

impl std::fmt::Debug for CacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheProvider")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
