//! Two-tier palette cache.
//!
//! Palettes are cached in two stores reached through narrow traits:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                TieredCache                  │
//! │  get: fast ──miss──▶ durable ──hit──▶ backfill fast (background)
//! │  put: fast + durable (background)           │
//! └───────────┬───────────────────┬─────────────┘
//!             ▼                   ▼
//!   ┌──────────────────┐  ┌──────────────────┐
//!   │    FastCache     │  │   DurableStore   │
//!   │  best effort,    │  │  authoritative,  │
//!   │  may forget      │  │  TTL bounded     │
//!   └──────────────────┘  └──────────────────┘
//! ```
//!
//! Entries are write-once: a key is never rewritten with a different value
//! and there is no delete. Staleness is bounded by [`PALETTE_TTL`].
//!
//! # Components
//!
//! - [`FastCache`] / [`DurableStore`]: Store seams, injected into [`TieredCache`]
//! - [`MemoryFastCache`]: In-process LRU fast tier
//! - [`MemoryDurableStore`]: In-process TTL store for development and tests
//! - [`RedisDurableStore`]: Redis-backed durable tier
//! - [`CacheKey`]: `{count}:{slug}`
//! - [`CacheTask`]: Handle to a background write or backfill

mod memory;
mod redis_store;
mod tiered;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::CacheError;

pub use memory::{MemoryDurableStore, MemoryFastCache, DEFAULT_FAST_CACHE_ENTRIES};
pub use redis_store::RedisDurableStore;
pub use tiered::{CacheLookup, TieredCache};

/// Lifetime of a cached palette: 30 days.
pub const PALETTE_TTL: Duration = Duration::from_secs(2_592_000);

// =============================================================================
// Store Traits
// =============================================================================

/// Ephemeral, best-effort tier.
///
/// May return `None` for keys that were recently written.
#[async_trait]
pub trait FastCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn put(&self, key: &str, value: Bytes) -> Result<(), CacheError>;
}

/// Authoritative tier. A written key stays readable until its TTL expires.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    /// Store `value` under `key` for `ttl`.
    ///
    /// Implementations keep the first value written for a key until it
    /// expires.
    async fn put(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;
}

// =============================================================================
// Cache Key
// =============================================================================

/// Cache key for a palette: color count plus image slug.
///
/// The count is part of the key because different counts yield different
/// palettes for the same image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub color_count: usize,
    pub slug: Arc<str>,
}

impl CacheKey {
    pub fn new(color_count: usize, slug: impl Into<Arc<str>>) -> Self {
        Self {
            color_count,
            slug: slug.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.color_count, self.slug)
    }
}

// =============================================================================
// Background Task Handle
// =============================================================================

/// Handle to a cache write or backfill running in the background.
///
/// Dropping the handle detaches the task; the request path never waits on
/// it. Tests call [`CacheTask::wait`] to observe the cache once it settles.
#[derive(Debug)]
pub struct CacheTask {
    handle: JoinHandle<()>,
}

impl CacheTask {
    pub(crate) fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Wait for the task to finish.
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            warn!(error = %e, "Background cache task did not complete");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task, as if its execution context had been torn down.
    pub fn abort(&self) {
        self.handle.abort();
    }
}
