//! HTTP request handlers for the palette API.
//!
//! This module contains the Axum handlers for palettes, single colors and
//! health checks.
//!
//! # Endpoints
//!
//! - `GET /?image=<url>&count=<n>` - Palette for an image (also `/palette`)
//! - `GET /color?image=<url>` - Single dominant color
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::PaletteError;
use crate::fetch::ImageFetcher;
use crate::palette::{Palette, Rgb};
use crate::service::PaletteService;

use super::validation::{RequestValidator, ValidationError};

/// Default `s-maxage` for successful responses (30 days).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 2_592_000;

/// Response header reporting whether the palette came from cache.
pub const CACHE_HIT_HEADER: HeaderName = HeaderName::from_static("x-palette-cache-hit");

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the palette service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<F: ImageFetcher> {
    /// The palette service for processing requests
    pub palette_service: Arc<PaletteService<F>>,

    /// Validator for the `image` and `count` query parameters
    pub validator: Arc<RequestValidator>,

    /// Shared-cache max-age in seconds
    pub cache_max_age: u32,
}

impl<F: ImageFetcher> AppState<F> {
    /// Create a new application state with the default host allow-list.
    pub fn new(palette_service: PaletteService<F>) -> Self {
        Self {
            palette_service: Arc::new(palette_service),
            validator: Arc::new(RequestValidator::default()),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }

    pub fn with_validator(mut self, validator: RequestValidator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }
}

impl<F: ImageFetcher> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            palette_service: Arc::clone(&self.palette_service),
            validator: Arc::clone(&self.validator),
            cache_max_age: self.cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Query parameters for palette and color requests.
///
/// Both are kept as raw strings so that bad values produce our own 400
/// messages instead of an extractor rejection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PaletteQueryParams {
    /// Source image URL
    pub image: Option<String>,

    /// Number of colors (1-10, defaults to 4)
    pub count: Option<String>,
}

impl PaletteQueryParams {
    /// Parse a raw query string.
    ///
    /// Parsing never fails. When a parameter repeats, its first value wins
    /// and unknown parameters are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();

        for (name, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match &*name {
                "image" => &mut params.image,
                "count" => &mut params.count,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        params
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of a palette response.
#[derive(Debug, Serialize)]
pub struct PaletteBody {
    pub palette: Palette,
}

/// Body of a single-color response.
#[derive(Debug, Serialize)]
pub struct ColorBody {
    pub color: Rgb,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert PaletteError to HTTP response.
///
/// An upstream status is passed through unchanged. 5xx errors are logged at
/// ERROR, upstream 404s at DEBUG and other 4xx at WARN.
impl IntoResponse for PaletteError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PaletteError::InvalidColorCount { .. } => (StatusCode::BAD_REQUEST, self.to_string()),

            PaletteError::UpstreamStatus { status } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                "image fetch failed".to_string(),
            ),

            PaletteError::Fetch { .. } => {
                (StatusCode::BAD_GATEWAY, "image fetch failed".to_string())
            }

            PaletteError::Decode { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to decode image".to_string(),
            ),

            PaletteError::NoColors => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no representative colors found".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Server error: {}", self);
        } else if status == StatusCode::NOT_FOUND {
            debug!(status = status.as_u16(), "Image not found upstream: {}", self);
        } else {
            warn!(status = status.as_u16(), "Client error: {}", self);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        warn!(status = 400u16, "Rejected request: {}", self);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Any failure a palette handler can return.
#[derive(Debug)]
pub enum HandlerError {
    Validation(ValidationError),
    Palette(PaletteError),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Validation(err) => err.into_response(),
            HandlerError::Palette(err) => err.into_response(),
        }
    }
}

impl From<ValidationError> for HandlerError {
    fn from(err: ValidationError) -> Self {
        HandlerError::Validation(err)
    }
}

impl From<PaletteError> for HandlerError {
    fn from(err: PaletteError) -> Self {
        HandlerError::Palette(err)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle palette requests.
///
/// # Endpoint
///
/// `GET /` or `GET /palette`
///
/// # Query Parameters
///
/// - `image`: Source image URL (required, host must be allow-listed)
/// - `count`: Number of colors, 1-10 (default: 4). A count of 1 is rejected
///   by the pipeline; use `/color` instead.
///
/// # Response
///
/// - `200 OK`: `{"palette": [[r,g,b], ...]}`
/// - `400 Bad Request`: Invalid parameters
/// - upstream status: The image host refused the fetch
/// - `422 Unprocessable Entity`: Every sampled pixel was transparent or white
/// - `500` / `502`: Decode or transport failure
///
/// # Headers
///
/// - `Content-Type: application/json`
/// - `Cache-Control: public, s-maxage={cache_max_age}`
/// - `X-Palette-Cache-Hit: true|false`
pub async fn palette_handler<F: ImageFetcher>(
    State(state): State<AppState<F>>,
    RawQuery(query): RawQuery,
) -> Result<Response, HandlerError> {
    let query = PaletteQueryParams::from_query(query.as_deref());
    let request = state
        .validator
        .validate(query.image.as_deref(), query.count.as_deref())?;

    // The background cache write outlives the response.
    let response = state.palette_service.get_palette(&request).await?;

    Ok(json_response(
        state.cache_max_age,
        response.cache_hit,
        PaletteBody {
            palette: response.palette,
        },
    ))
}

/// Handle single-color requests.
///
/// # Endpoint
///
/// `GET /color`
///
/// Returns `{"color": [r,g,b]}`, the most dominant entry of the image's
/// 5-color palette. `count` is ignored.
pub async fn color_handler<F: ImageFetcher>(
    State(state): State<AppState<F>>,
    RawQuery(query): RawQuery,
) -> Result<Response, HandlerError> {
    let query = PaletteQueryParams::from_query(query.as_deref());
    let (image_url, slug) = state.validator.validate_image(query.image.as_deref())?;

    let (color, response) = state
        .palette_service
        .dominant_color(&image_url, &slug)
        .await?;

    Ok(json_response(
        state.cache_max_age,
        response.cache_hit,
        ColorBody { color },
    ))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn json_response<T: Serialize>(cache_max_age: u32, cache_hit: bool, body: T) -> Response {
    (
        StatusCode::OK,
        [
            (
                header::CACHE_CONTROL,
                format!("public, s-maxage={}", cache_max_age),
            ),
            (CACHE_HIT_HEADER, cache_hit.to_string()),
        ],
        Json(body),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================
