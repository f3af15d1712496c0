//! Image decoding.
//!
//! Decoding is CPU-bound and synchronous. The service calls it inline on the
//! request task; nothing here touches the network.

use std::io::Cursor;

use image::ImageReader;

use crate::error::PaletteError;

use super::types::Bitmap;

/// Decodes fetched image bytes into a [`Bitmap`].
pub trait ImageCodec: Send + Sync {
    /// Decode `bytes`, failing with [`PaletteError::Decode`] on malformed or
    /// unsupported input.
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, PaletteError>;
}

/// [`ImageCodec`] backed by the `image` crate.
///
/// The format is guessed from the leading bytes, so any format compiled into
/// `image` (JPEG and PNG here) is accepted. Output is always RGBA.
#[derive(Debug, Clone, Default)]
pub struct ImageCrateCodec {}

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self {}
    }
}

impl ImageCodec for ImageCrateCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, PaletteError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PaletteError::Decode {
                message: e.to_string(),
            })?;

        let img = reader.decode().map_err(|e| PaletteError::Decode {
            message: e.to_string(),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Bitmap::new(width, height, 4, rgba.into_raw()).ok_or_else(|| PaletteError::Decode {
            message: format!("decoded buffer does not match {}x{}", width, height),
        })
    }
}
