//! Read-through / write-behind coordination of the two cache tiers.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::CacheError;
use crate::palette::Palette;

use super::{CacheKey, CacheTask, DurableStore, FastCache, PALETTE_TTL};

// =============================================================================
// Lookup Result
// =============================================================================

/// Outcome of [`TieredCache::get`].
#[derive(Debug)]
pub enum CacheLookup {
    /// Served by the fast tier.
    Fast(Palette),

    /// Served by the durable tier; `backfill` is copying it into the fast tier.
    Durable { palette: Palette, backfill: CacheTask },

    /// Neither tier had the key.
    Miss,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        !matches!(self, CacheLookup::Miss)
    }

    pub fn palette(&self) -> Option<&Palette> {
        match self {
            CacheLookup::Fast(palette) | CacheLookup::Durable { palette, .. } => Some(palette),
            CacheLookup::Miss => None,
        }
    }
}

// =============================================================================
// Tiered Cache
// =============================================================================

/// Palette cache over a fast tier and a durable tier.
///
/// The cache holds no locks of its own; consistency comes from the stores.
/// Store failures never reach the caller: reads degrade to a miss and writes
/// are logged and dropped.
///
/// Background tasks are spawned on the current tokio runtime.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use palette_server::cache::{CacheKey, MemoryDurableStore, MemoryFastCache, TieredCache};
/// use palette_server::palette::{Palette, Rgb};
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TieredCache::new(
///         Arc::new(MemoryFastCache::new()),
///         Arc::new(MemoryDurableStore::new()),
///     );
///
///     let key = CacheKey::new(4, "slug");
///     let palette = Palette::new(vec![Rgb::new(1, 2, 3)]);
///
///     cache.put(&key, &palette).wait().await;
///     assert_eq!(cache.get(&key).await.palette(), Some(&palette));
/// }
/// ```
#[derive(Clone)]
pub struct TieredCache {
    fast: Arc<dyn FastCache>,
    durable: Arc<dyn DurableStore>,
    ttl: Duration,
}

impl TieredCache {
    /// Create a tiered cache with the standard 30 day TTL.
    pub fn new(fast: Arc<dyn FastCache>, durable: Arc<dyn DurableStore>) -> Self {
        Self::with_ttl(fast, durable, PALETTE_TTL)
    }

    pub fn with_ttl(fast: Arc<dyn FastCache>, durable: Arc<dyn DurableStore>, ttl: Duration) -> Self {
        Self { fast, durable, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a palette, fast tier first.
    ///
    /// A durable-tier hit returns immediately and schedules a backfill of the
    /// fast tier.
    pub async fn get(&self, key: &CacheKey) -> CacheLookup {
        let key_str = key.to_string();

        match self.fast.get(&key_str).await {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(palette) => {
                    debug!(key = %key_str, "Fast tier hit");
                    return CacheLookup::Fast(palette);
                }
                Err(e) => warn!(key = %key_str, error = %e, "Ignoring undecodable fast tier entry"),
            },
            Ok(None) => {}
            Err(e) => debug!(key = %key_str, error = %e, "Fast tier lookup failed, treating as miss"),
        }

        let bytes = match self.durable.get(&key_str).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %key_str, "Cache miss");
                return CacheLookup::Miss;
            }
            Err(e) => {
                warn!(key = %key_str, error = %e, "Durable tier lookup failed, treating as miss");
                return CacheLookup::Miss;
            }
        };

        let palette = match decode(&bytes) {
            Ok(palette) => palette,
            Err(e) => {
                warn!(key = %key_str, error = %e, "Ignoring undecodable durable tier entry");
                return CacheLookup::Miss;
            }
        };

        debug!(key = %key_str, "Durable tier hit, backfilling fast tier");

        let fast = Arc::clone(&self.fast);
        let backfill = CacheTask::spawn(async move {
            if let Err(e) = fast.put(&key_str, bytes).await {
                debug!(key = %key_str, error = %e, "Fast tier backfill dropped");
            }
        });

        CacheLookup::Durable { palette, backfill }
    }

    /// Schedule writes of `palette` to both tiers.
    ///
    /// Returns immediately. Failures are logged and swallowed.
    pub fn put(&self, key: &CacheKey, palette: &Palette) -> CacheTask {
        let key_str = key.to_string();
        let fast = Arc::clone(&self.fast);
        let durable = Arc::clone(&self.durable);
        let ttl = self.ttl;

        let bytes = match encode(palette) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key_str, error = %e, "Palette not cached");
                return CacheTask::spawn(async {});
            }
        };

        CacheTask::spawn(async move {
            let (durable_result, fast_result) = tokio::join!(
                durable.put(&key_str, bytes.clone(), ttl),
                fast.put(&key_str, bytes),
            );

            if let Err(e) = durable_result {
                warn!(key = %key_str, error = %e, "Durable tier write failed");
            }
            if let Err(e) = fast_result {
                debug!(key = %key_str, error = %e, "Fast tier write dropped");
            }
        })
    }
}

fn encode(palette: &Palette) -> Result<Bytes, CacheError> {
    serde_json::to_vec(palette)
        .map(Bytes::from)
        .map_err(|e| CacheError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Palette, CacheError> {
    let palette: Palette =
        serde_json::from_slice(bytes).map_err(|e| CacheError::Serialization(e.to_string()))?;

    if palette.is_empty() {
        return Err(CacheError::Serialization("empty palette".to_string()));
    }
    Ok(palette)
}

// =============================================================================
// Tests
// =============================================================================
