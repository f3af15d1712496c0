//! Test utilities for integration tests.
//!
//! This module provides mock implementations of the upstream fetcher and the
//! fast cache tier, plus helpers for generating PNG test images.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use tokio::sync::RwLock;
use tower::ServiceExt;

use palette_server::cache::{FastCache, MemoryDurableStore, MemoryFastCache, TieredCache};
use palette_server::error::{CacheError, FetchError};
use palette_server::fetch::ImageFetcher;
use palette_server::service::PaletteService;
use palette_server::{create_router, RouterConfig};

/// A 40-character slug as found in real image URLs.
pub const SLUG: &str = "ab67616d0000b273e8b066f70c206551210d902b";

/// Allow-listed image URL carrying [`SLUG`].
pub fn image_url() -> String {
    format!("https://i.scdn.co/image/{}", SLUG)
}

/// Allow-listed image URL with a different slug.
pub fn other_image_url() -> String {
    "https://i.scdn.co/image/0000000000000000000000000000000000000001".to_string()
}

// =============================================================================
// Mock Image Fetcher with Request Tracking
// =============================================================================

/// A mock fetcher that serves one fixed response and tracks all requests.
#[derive(Clone)]
pub struct TrackingMockFetcher {
    response: Result<Bytes, FetchError>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl TrackingMockFetcher {
    /// Serve `data` for every URL.
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_response(Ok(Bytes::from(data)))
    }

    /// Answer every URL with a non-success upstream status.
    pub fn with_status(status: u16) -> Self {
        Self::with_response(Err(FetchError::Status { status }))
    }

    /// Fail every request before a response arrives.
    pub fn unreachable() -> Self {
        Self::with_response(Err(FetchError::Transport("connection refused".to_string())))
    }

    fn with_response(response: Result<Bytes, FetchError>) -> Self {
        Self {
            response,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl ImageFetcher for TrackingMockFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push(url.to_string());
        self.response.clone()
    }
}

// =============================================================================
// Failing Fast Cache
// =============================================================================

/// A fast tier that is unreachable for both reads and writes.
#[derive(Default)]
pub struct FailingFastCache {
    attempts: AtomicUsize,
}

impl FailingFastCache {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FastCache for FailingFastCache {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Connection("fast tier unavailable".to_string()))
    }

    async fn put(&self, _key: &str, _value: Bytes) -> Result<(), CacheError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Connection("fast tier unavailable".to_string()))
    }
}

// =============================================================================
// Test Harness
// =============================================================================

/// Router plus handles on everything behind it.
pub struct TestApp {
    pub router: Router,
    pub fetcher: TrackingMockFetcher,
    pub fast: Arc<MemoryFastCache>,
    pub durable: Arc<MemoryDurableStore>,
}

impl TestApp {
    /// Build a router with in-memory tiers, tracing disabled.
    pub fn new(fetcher: TrackingMockFetcher) -> Self {
        let durable = Arc::new(MemoryDurableStore::new());
        Self::with_durable(fetcher, durable)
    }

    /// Build a router over an existing durable tier, as a second instance
    /// sharing the same store would be.
    pub fn with_durable(fetcher: TrackingMockFetcher, durable: Arc<MemoryDurableStore>) -> Self {
        let fast = Arc::new(MemoryFastCache::new());
        let cache = TieredCache::new(fast.clone(), durable.clone());
        let service = PaletteService::new(fetcher.clone(), cache);
        let router = create_router(service, RouterConfig::new().with_tracing(false));

        Self {
            router,
            fetcher,
            fast,
            durable,
        }
    }

    /// Send a GET request for `uri`.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Wait until the durable tier holds `count` entries.
    pub async fn wait_for_durable_entries(&self, count: usize) {
        wait_for_entries(&self.durable, count).await;
    }
}

/// Poll a durable store until it holds `count` live entries.
///
/// Cache writes run in the background after the response is sent.
pub async fn wait_for_entries(store: &MemoryDurableStore, count: usize) {
    for _ in 0..200 {
        if store.len().await >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "durable tier never reached {} entries (has {})",
        count,
        store.len().await
    );
}

/// Percent-encode a URL for use as the `image` query value.
pub fn palette_uri(path: &str, image: &str, count: Option<&str>) -> String {
    let mut uri = format!(
        "{}?image={}",
        path,
        url::form_urlencoded::byte_serialize(image.as_bytes()).collect::<String>()
    );
    if let Some(count) = count {
        uri.push_str("&count=");
        uri.push_str(count);
    }
    uri
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Test Image Generation
// =============================================================================

/// Encode an RGBA image as PNG.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .unwrap();
    buf.into_inner()
}

/// 10x10 image, top half pure red and bottom half pure blue.
pub fn create_red_blue_png() -> Vec<u8> {
    let image = RgbaImage::from_fn(10, 10, |_, y| {
        if y < 5 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 0, 255, 255])
        }
    });
    encode_png(&image)
}

/// Image filled with a single color.
pub fn create_solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
}

/// Image with many distinct colors along a red/green gradient.
pub fn create_gradient_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        image::Rgba([r, g, 64, 255])
    });
    encode_png(&image)
}

/// Red square on a fully transparent background.
pub fn create_transparent_padded_png() -> Vec<u8> {
    let image = RgbaImage::from_fn(10, 10, |x, y| {
        if (3..7).contains(&x) && (3..7).contains(&y) {
            image::Rgba([200, 20, 20, 255])
        } else {
            image::Rgba([0, 255, 0, 0])
        }
    });
    encode_png(&image)
}
