//! Router configuration for the palette server.
//!
//! This module defines the HTTP routes and applies CORS and tracing
//! middleware.
//!
//! # Route Structure
//!
//! ```text
//! /health                    - Health check
//! /?image=&count=            - Palette
//! /palette?image=&count=     - Palette (alias)
//! /color?image=              - Single dominant color
//! ```
//!
//! # Example
//!
//! ```ignore
//! use palette_server::server::routes::{create_router, RouterConfig};
//! use palette_server::service::PaletteService;
//!
//! let service = PaletteService::new(HttpImageFetcher::new(), cache);
//!
//! let config = RouterConfig::new()
//!     .with_allowed_hosts(vec!["i.scdn.co".to_string()])
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    color_handler, health_handler, palette_handler, AppState, CACHE_HIT_HEADER,
    DEFAULT_CACHE_MAX_AGE,
};
use super::validation::{RequestValidator, DEFAULT_ALLOWED_HOSTS};
use crate::fetch::ImageFetcher;
use crate::service::PaletteService;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Image hosts the `image` parameter may point at
    pub allowed_hosts: Vec<String>,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control s-maxage in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration.
    ///
    /// By default:
    /// - Only `i.scdn.co` images are accepted
    /// - CORS allows any origin
    /// - s-maxage is 30 days
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            cors_origins: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            enable_tracing: true,
        }
    }

    /// Replace the image host allow-list.
    pub fn with_allowed_hosts(mut self, hosts: Vec<String>) -> Self {
        self.allowed_hosts = hosts;
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the Cache-Control s-maxage in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// # Arguments
///
/// * `palette_service` - The service handling palette requests
/// * `config` - Router configuration
pub fn create_router<F>(palette_service: PaletteService<F>, config: RouterConfig) -> Router
where
    F: ImageFetcher + 'static,
{
    let app_state = AppState::new(palette_service)
        .with_validator(RequestValidator::new(config.allowed_hosts.iter().cloned()))
        .with_cache_max_age(config.cache_max_age);

    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/", get(palette_handler::<F>))
        .route("/palette", get(palette_handler::<F>))
        .route("/color", get(color_handler::<F>))
        .route("/health", get(health_handler))
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([CACHE_HIT_HEADER])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
