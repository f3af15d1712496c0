//! HTTP server layer for the palette service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │          GET /?image=<url>&count=<n>    GET /color              │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │ validation  │  │  handlers   │  │        routes           │  │
//! │  │ (host,slug) │  │ (requests)  │  │  (router config)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;
pub mod validation;

pub use handlers::{
    color_handler, health_handler, palette_handler, AppState, ColorBody, ErrorResponse,
    HandlerError, HealthResponse, PaletteBody, PaletteQueryParams, CACHE_HIT_HEADER,
    DEFAULT_CACHE_MAX_AGE,
};
pub use routes::{create_router, RouterConfig};
pub use validation::{extract_slug, RequestValidator, ValidationError, DEFAULT_ALLOWED_HOSTS};
