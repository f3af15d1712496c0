//! Palette extraction pipeline.
//!
//! This module turns a decoded bitmap into a short list of representative
//! colors. It has no I/O of its own; the service layer feeds it bytes that
//! were already fetched.
//!
//! # Pipeline
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │  ImageCodec  │ ─▶ │ sample_pixels│ ─▶ │  ColorQuantizer  │ ─▶ Palette
//! │ (bytes →     │    │ (stride,     │    │  (median cut)    │
//! │  Bitmap)     │    │  filtering)  │    │                  │
//! └──────────────┘    └──────────────┘    └──────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Bitmap`]: Decoded image with an interleaved channel buffer
//! - [`ImageCodec`]: Decoder seam; [`ImageCrateCodec`] is the default implementation
//! - [`sample_pixels`]: Fixed-stride subsampling that drops transparent and near-white pixels
//! - [`ColorQuantizer`]: Median-cut box splitting down to at most `k` colors
//! - [`Palette`]: Ordered output, most dominant color first
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use palette_server::palette::{sample_pixels, Bitmap, ColorQuantizer};
//!
//! let mut data = Vec::new();
//! for i in 0..100 {
//!     if i < 50 {
//!         data.extend_from_slice(&[255, 0, 0, 255]);
//!     } else {
//!         data.extend_from_slice(&[0, 0, 255, 255]);
//!     }
//! }
//! let bitmap = Bitmap::new(10, 10, 4, data).unwrap();
//!
//! let pixels = sample_pixels(&bitmap, NonZeroUsize::MIN);
//! let palette = ColorQuantizer::new(2).unwrap().quantize(&pixels).unwrap();
//! assert_eq!(palette.len(), 2);
//! ```

mod codec;
mod quantizer;
mod sampler;
mod types;

pub use codec::{ImageCodec, ImageCrateCodec};
pub use quantizer::{
    is_valid_color_count, ColorBox, ColorQuantizer, Component, DEFAULT_COLOR_COUNT,
    MAX_COLOR_COUNT, MIN_COLOR_COUNT,
};
pub use sampler::{sample_pixels, ALPHA_THRESHOLD, WHITE_THRESHOLD};
pub use types::{Bitmap, Palette, Rgb};
