//! In-process cache tiers.
//!
//! [`MemoryFastCache`] is the production fast tier: a per-instance LRU that
//! forgets entries under pressure. [`MemoryDurableStore`] honours the
//! durable-tier contract within a single process and backs development runs
//! and tests when no Redis is configured.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::CacheError;

use super::{DurableStore, FastCache};

/// Default number of palettes kept in the fast tier.
pub const DEFAULT_FAST_CACHE_ENTRIES: usize = 10_000;

// =============================================================================
// Fast Tier
// =============================================================================

/// LRU fast tier bounded by entry count.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use palette_server::cache::{FastCache, MemoryFastCache};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = MemoryFastCache::with_capacity(2);
///     cache.put("4:a", Bytes::from_static(b"[]")).await.unwrap();
///     assert!(cache.get("4:a").await.unwrap().is_some());
/// }
/// ```
pub struct MemoryFastCache {
    cache: RwLock<LruCache<String, Bytes>>,
    capacity: usize,
}

impl MemoryFastCache {
    /// Create a fast tier holding [`DEFAULT_FAST_CACHE_ENTRIES`] palettes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FAST_CACHE_ENTRIES)
    }

    /// Create a fast tier holding at most `capacity` palettes.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            capacity: capacity.get(),
        }
    }

    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Check for a key without updating LRU order.
    pub async fn contains(&self, key: &str) -> bool {
        self.cache.read().await.contains(key)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MemoryFastCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FastCache for MemoryFastCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut cache = self.cache.write().await;
        Ok(cache.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let mut cache = self.cache.write().await;
        cache.put(key.to_string(), value);
        Ok(())
    }
}

// =============================================================================
// Durable Tier
// =============================================================================

struct StoredEntry {
    value: Bytes,
    expires_at: Instant,
}

impl StoredEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Map size at which the first expiry sweep runs.
const MIN_SWEEP_THRESHOLD: usize = 256;

struct DurableEntries {
    map: HashMap<String, StoredEntry>,
    /// Sweep expired entries once the map reaches this size.
    sweep_at: usize,
}

impl DurableEntries {
    fn purge(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, e| e.is_live(now));
        self.sweep_at = (self.map.len() * 2).max(MIN_SWEEP_THRESHOLD);
        before - self.map.len()
    }
}

/// In-process durable tier with per-key expiry.
///
/// Write-once: a put for a key that is still live is ignored. Expired
/// entries are swept on insert whenever the map has doubled since the last
/// sweep, so dead keys never outnumber live ones for long.
pub struct MemoryDurableStore {
    entries: RwLock<DurableEntries>,
}

impl MemoryDurableStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(DurableEntries {
                map: HashMap::new(),
                sweep_at: MIN_SWEEP_THRESHOLD,
            }),
        }
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.map.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) -> usize {
        self.entries.write().await.purge(Instant::now())
    }
}

impl Default for MemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for MemoryDurableStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .map
            .get(key)
            .filter(|e| e.is_live(Instant::now()))
            .map(|e| e.value.clone()))
    }

    async fn put(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if entries.map.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(());
        }

        if entries.map.len() >= entries.sweep_at {
            entries.purge(now);
        }

        entries.map.insert(
            key.to_string(),
            StoredEntry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
