//! Core value types shared by the sampler, quantizer and cache.

use serde::{Deserialize, Serialize};

// =============================================================================
// Rgb
// =============================================================================

/// An opaque RGB color.
///
/// Serializes as a bare `[r, g, b]` array, which is both the JSON wire format
/// and the format stored in the cache tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(channels: [u8; 3]) -> Self {
        Self(channels)
    }
}

// =============================================================================
// Palette
// =============================================================================

/// An ordered list of representative colors, most dominant first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Rgb>);

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self(colors)
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most dominant color, if any.
    pub fn first(&self) -> Option<Rgb> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rgb> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<Rgb> {
        self.0
    }
}

impl From<Vec<Rgb>> for Palette {
    fn from(colors: Vec<Rgb>) -> Self {
        Self(colors)
    }
}

// =============================================================================
// Bitmap
// =============================================================================

/// A decoded image: dimensions plus an interleaved channel buffer.
///
/// `channels` is 3 (RGB, no alpha) or 4 (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wrap a channel buffer.
    ///
    /// Returns `None` if `channels` is not 3 or 4, or if the buffer is too
    /// short for `width * height` pixels.
    pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Option<Self> {
        if channels != 3 && channels != 4 {
            return None;
        }
        let needed = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(channels)?;
        if data.len() < needed {
            return None;
        }

        Some(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
