//! Pixel sampling.
//!
//! Visits every `stride`-th pixel of a bitmap and keeps the ones that should
//! influence the palette. Transparent padding and flat white backgrounds are
//! dropped so they do not dominate the result.

use std::num::NonZeroUsize;

use super::types::{Bitmap, Rgb};

/// Minimum alpha for a pixel to count as opaque (roughly 49%).
pub const ALPHA_THRESHOLD: u8 = 125;

/// A pixel is near-white when every channel is strictly above this value.
pub const WHITE_THRESHOLD: u8 = 250;

/// Sample a bitmap at a fixed stride.
///
/// Pixel indices `0, stride, 2 * stride, ...` below the pixel count are
/// visited. A visited pixel is kept if it has no alpha channel or its alpha
/// is at least [`ALPHA_THRESHOLD`], and it is not near-white.
///
/// The result may be empty.
pub fn sample_pixels(bitmap: &Bitmap, stride: NonZeroUsize) -> Vec<Rgb> {
    let channels = bitmap.channels();
    let data = bitmap.data();
    let has_alpha = bitmap.has_alpha();

    (0..bitmap.pixel_count())
        .step_by(stride.get())
        .filter_map(|index| {
            let offset = index * channels;
            let px = &data[offset..offset + channels];

            if has_alpha && px[3] < ALPHA_THRESHOLD {
                return None;
            }
            if is_near_white(px[0], px[1], px[2]) {
                return None;
            }

            Some(Rgb::new(px[0], px[1], px[2]))
        })
        .collect()
}

#[inline]
fn is_near_white(r: u8, g: u8, b: u8) -> bool {
    r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD
}
