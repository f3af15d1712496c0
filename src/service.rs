//! Palette Service for orchestrating palette extraction.
//!
//! The PaletteService is the main entry point for palette requests:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                          PaletteService                           │
//! │  get_palette()                                                    │
//! │   1. Validate count     4. Decode          7. Cache write (bg)    │
//! │   2. Cache lookup       5. Sample          8. Respond             │
//! │   3. Fetch (miss only)  6. Quantize                               │
//! └───────┬─────────────────────┬─────────────────────┬───────────────┘
//!         ▼                     ▼                     ▼
//!   ┌─────────────┐     ┌──────────────┐     ┌──────────────────┐
//!   │ TieredCache │     │ ImageFetcher │     │ ImageCodec +     │
//!   │             │     │              │     │ ColorQuantizer   │
//!   └─────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! A cache hit performs no fetch and no quantization. A miss performs
//! exactly one fetch and one quantization pass. Nothing is retried.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{CacheKey, CacheLookup, CacheTask, TieredCache};
use crate::error::PaletteError;
use crate::fetch::ImageFetcher;
use crate::palette::{
    is_valid_color_count, sample_pixels, ColorQuantizer, ImageCodec, ImageCrateCodec, Palette, Rgb,
};

/// Color count used to pick the single dominant color.
pub const DOMINANT_COLOR_COUNT: usize = 5;

// =============================================================================
// Request / Response
// =============================================================================

/// A validated palette request.
#[derive(Debug, Clone)]
pub struct PaletteRequest {
    /// Source image URL
    pub image_url: String,

    /// Stable identifier of the image, used in the cache key
    pub slug: String,

    /// Requested number of colors (2-20)
    pub color_count: usize,
}

impl PaletteRequest {
    pub fn new(image_url: impl Into<String>, slug: impl Into<String>, color_count: usize) -> Self {
        Self {
            image_url: image_url.into(),
            slug: slug.into(),
            color_count,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.color_count, self.slug.as_str())
    }
}

/// Response from the palette service.
#[derive(Debug)]
pub struct PaletteResponse {
    /// The palette, most dominant color first
    pub palette: Palette,

    /// Whether the palette came from either cache tier
    pub cache_hit: bool,

    /// Background cache write or backfill started by this request, if any.
    ///
    /// Dropping it leaves the task running.
    pub cache_task: Option<CacheTask>,
}

// =============================================================================
// Palette Service
// =============================================================================

/// Service for extracting and caching palettes.
///
/// # Type Parameters
///
/// * `F` - The image fetcher (e.g. [`HttpImageFetcher`](crate::fetch::HttpImageFetcher))
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use palette_server::cache::{MemoryDurableStore, MemoryFastCache, TieredCache};
/// use palette_server::fetch::HttpImageFetcher;
/// use palette_server::service::{PaletteRequest, PaletteService};
///
/// let cache = TieredCache::new(Arc::new(MemoryFastCache::new()), Arc::new(MemoryDurableStore::new()));
/// let service = PaletteService::new(HttpImageFetcher::new(), cache);
///
/// let response = service
///     .get_palette(&PaletteRequest::new("https://i.scdn.co/image/...", "slug", 4))
///     .await?;
/// ```
pub struct PaletteService<F: ImageFetcher> {
    fetcher: F,
    codec: Arc<dyn ImageCodec>,
    cache: TieredCache,
    stride: NonZeroUsize,
}

impl<F: ImageFetcher> PaletteService<F> {
    /// Create a service with the default codec, sampling every pixel.
    pub fn new(fetcher: F, cache: TieredCache) -> Self {
        Self {
            fetcher,
            codec: Arc::new(ImageCrateCodec::new()),
            cache,
            stride: NonZeroUsize::MIN,
        }
    }

    /// Replace the image codec.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Sample every `stride`-th pixel instead of every pixel.
    pub fn with_stride(mut self, stride: NonZeroUsize) -> Self {
        self.stride = stride;
        self
    }

    pub fn cache(&self) -> &TieredCache {
        &self.cache
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Get a palette, using the cache when available.
    ///
    /// # Errors
    ///
    /// - [`PaletteError::InvalidColorCount`] if the count is outside 2-20.
    ///   Checked before anything else happens.
    /// - [`PaletteError::UpstreamStatus`] / [`PaletteError::Fetch`] if the image
    ///   cannot be fetched
    /// - [`PaletteError::Decode`] if the bytes are not an image
    /// - [`PaletteError::NoColors`] if every sampled pixel was filtered out
    pub async fn get_palette(&self, request: &PaletteRequest) -> Result<PaletteResponse, PaletteError> {
        if !is_valid_color_count(request.color_count) {
            return Err(PaletteError::InvalidColorCount {
                count: request.color_count,
            });
        }

        let key = request.cache_key();

        match self.cache.get(&key).await {
            CacheLookup::Fast(palette) => {
                debug!(key = %key, "Cache hit (fast tier)");
                return Ok(PaletteResponse {
                    palette,
                    cache_hit: true,
                    cache_task: None,
                });
            }
            CacheLookup::Durable { palette, backfill } => {
                debug!(key = %key, "Cache hit (durable tier)");
                return Ok(PaletteResponse {
                    palette,
                    cache_hit: true,
                    cache_task: Some(backfill),
                });
            }
            CacheLookup::Miss => {
                info!(key = %key, "Cache miss");
            }
        }

        let palette = self.generate_palette(request).await?;
        let cache_task = self.cache.put(&key, &palette);

        Ok(PaletteResponse {
            palette,
            cache_hit: false,
            cache_task: Some(cache_task),
        })
    }

    /// Fetch, decode, sample and quantize without touching the cache.
    pub async fn generate_palette(&self, request: &PaletteRequest) -> Result<Palette, PaletteError> {
        let quantizer = ColorQuantizer::new(request.color_count)?;

        let bytes = self.fetcher.fetch(&request.image_url).await?;

        let bitmap = self.codec.decode(&bytes)?;
        let pixels = sample_pixels(&bitmap, self.stride);

        debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            sampled = pixels.len(),
            "Sampled image"
        );

        Ok(quantizer.quantize(&pixels)?)
    }

    /// Get the single most dominant color of an image.
    ///
    /// This is the first entry of a [`DOMINANT_COLOR_COUNT`]-color palette and
    /// shares that palette's cache entry.
    pub async fn dominant_color(
        &self,
        image_url: &str,
        slug: &str,
    ) -> Result<(Rgb, PaletteResponse), PaletteError> {
        let request = PaletteRequest::new(image_url, slug, DOMINANT_COLOR_COUNT);
        let response = self.get_palette(&request).await?;
        let color = response.palette.first().ok_or(PaletteError::NoColors)?;
        Ok((color, response))
    }
}

// =============================================================================
// Tests
// =============================================================================
