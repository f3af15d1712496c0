//! # Palette Server
//!
//! Extracts small, representative color palettes from remote images and
//! serves them over HTTP behind a two-tier cache.
//!
//! ## Features
//!
//! - **Median-cut quantization**: Deterministic box splitting by population × volume
//! - **Filtered sampling**: Transparent and near-white pixels never bias a palette
//! - **Two-tier caching**: In-process LRU in front of a durable TTL store (Redis)
//! - **Write-once entries**: Cached palettes are immutable for 30 days
//!
//! ## Architecture
//!
//! - [`palette`] - Pixel sampling, quantization and image decoding
//! - [`cache`] - Fast and durable cache tiers
//! - [`fetch`] - Upstream image fetching
//! - [`service`] - Request orchestration
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use palette_server::{
//!     create_router, HttpImageFetcher, MemoryDurableStore, MemoryFastCache, PaletteService,
//!     RouterConfig, TieredCache,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache = TieredCache::new(
//!         Arc::new(MemoryFastCache::new()),
//!         Arc::new(MemoryDurableStore::new()),
//!     );
//!     let service = PaletteService::new(HttpImageFetcher::new(), cache);
//!     let router = create_router(service, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod palette;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use cache::{
    CacheKey, CacheLookup, CacheTask, DurableStore, FastCache, MemoryDurableStore,
    MemoryFastCache, RedisDurableStore, TieredCache, PALETTE_TTL,
};
pub use config::Config;
pub use error::{CacheError, FetchError, PaletteError, QuantizeError};
pub use fetch::{HttpImageFetcher, ImageFetcher};
pub use palette::{
    sample_pixels, Bitmap, ColorQuantizer, ImageCodec, ImageCrateCodec, Palette, Rgb,
    MAX_COLOR_COUNT, MIN_COLOR_COUNT,
};
pub use server::{
    create_router, AppState, ErrorResponse, RequestValidator, RouterConfig, ValidationError,
};
pub use service::{PaletteRequest, PaletteResponse, PaletteService, DOMINANT_COLOR_COUNT};
