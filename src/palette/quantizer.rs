//! Median-cut color quantization.
//!
//! The sample starts as a single box spanning every pixel. The box with the
//! highest `population * volume` is repeatedly cut in two along its longest
//! channel at the median pixel, until there are `k` boxes or nothing left
//! can be cut. Each final box contributes its average color.
//!
//! Pixels are kept at full 8-bit precision; no histogram bucketing is done.
//!
//! # Ordering
//!
//! Every box gets a sequence number when it is created. The split queue
//! breaks priority ties by the lower sequence number, and the final palette
//! is ordered by population (largest first), then by sequence number. The
//! same sample and `k` therefore always yield the same palette.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::QuantizeError;

use super::types::{Palette, Rgb};

/// Smallest color count the quantizer accepts.
pub const MIN_COLOR_COUNT: usize = 2;

/// Largest color count the quantizer accepts.
pub const MAX_COLOR_COUNT: usize = 20;

/// Color count used when a caller does not ask for one.
pub const DEFAULT_COLOR_COUNT: usize = 4;

/// Returns `true` if `count` is in `MIN_COLOR_COUNT..=MAX_COLOR_COUNT`.
#[inline]
pub fn is_valid_color_count(count: usize) -> bool {
    (MIN_COLOR_COUNT..=MAX_COLOR_COUNT).contains(&count)
}

// =============================================================================
// Component
// =============================================================================

/// A color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Red,
    Green,
    Blue,
}

impl Component {
    #[inline]
    fn value(self, pixel: &Rgb) -> u8 {
        match self {
            Component::Red => pixel.r(),
            Component::Green => pixel.g(),
            Component::Blue => pixel.b(),
        }
    }
}

// =============================================================================
// Color Box
// =============================================================================

/// An axis-aligned region of RGB space owning the sample pixels inside it.
///
/// The channel ranges are tight around the owned pixels.
#[derive(Debug, Clone)]
pub struct ColorBox {
    pixels: Vec<Rgb>,
    red: (u8, u8),
    green: (u8, u8),
    blue: (u8, u8),
    volume: u64,
    seq: u64,
}

impl ColorBox {
    fn new(pixels: Vec<Rgb>, seq: u64) -> Self {
        let mut red = (u8::MAX, u8::MIN);
        let mut green = (u8::MAX, u8::MIN);
        let mut blue = (u8::MAX, u8::MIN);

        for pixel in &pixels {
            red = (red.0.min(pixel.r()), red.1.max(pixel.r()));
            green = (green.0.min(pixel.g()), green.1.max(pixel.g()));
            blue = (blue.0.min(pixel.b()), blue.1.max(pixel.b()));
        }

        // Inclusive lengths so a flat dimension still counts as 1.
        let volume = (red.1 - red.0) as u64 + 1;
        let volume = volume * ((green.1 - green.0) as u64 + 1);
        let volume = volume * ((blue.1 - blue.0) as u64 + 1);

        Self {
            pixels,
            red,
            green,
            blue,
            volume,
            seq,
        }
    }

    /// Number of sample pixels in the box.
    pub fn population(&self) -> usize {
        self.pixels.len()
    }

    /// Product of the inclusive channel lengths.
    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn red_range(&self) -> (u8, u8) {
        self.red
    }

    pub fn green_range(&self) -> (u8, u8) {
        self.green
    }

    pub fn blue_range(&self) -> (u8, u8) {
        self.blue
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    fn priority(&self) -> u64 {
        self.pixels.len() as u64 * self.volume
    }

    /// A box can be cut while its pixels differ in at least one channel.
    pub fn can_split(&self) -> bool {
        self.red.0 != self.red.1 || self.green.0 != self.green.1 || self.blue.0 != self.blue.1
    }

    /// The channel with the widest range. Ties go to red, then green.
    pub fn longest_component(&self) -> Component {
        let red = self.red.1 - self.red.0;
        let green = self.green.1 - self.green.0;
        let blue = self.blue.1 - self.blue.0;

        if red >= green && red >= blue {
            Component::Red
        } else if green >= blue {
            Component::Green
        } else {
            Component::Blue
        }
    }

    /// Per-pixel average of the box, rounded to the nearest integer.
    pub fn average_color(&self) -> Rgb {
        let count = self.pixels.len() as u64;
        if count == 0 {
            return Rgb::new(0, 0, 0);
        }

        let (r, g, b) = self.pixels.iter().fold((0u64, 0u64, 0u64), |(r, g, b), p| {
            (r + p.r() as u64, g + p.g() as u64, b + p.b() as u64)
        });

        let mean = |sum: u64| ((sum + count / 2) / count) as u8;
        Rgb::new(mean(r), mean(g), mean(b))
    }

    /// Cut the box in two along its longest channel.
    ///
    /// Pixels are sorted by that channel and the cut lands on the value
    /// boundary closest to the median index, so both halves are non-empty and
    /// no color ends up on both sides.
    fn split(mut self, lower_seq: u64, upper_seq: u64) -> (ColorBox, ColorBox) {
        debug_assert!(self.can_split());

        let component = self.longest_component();
        self.pixels.sort_unstable_by_key(|p| (component.value(p), *p));

        let split_at = self.split_point(component);
        let upper = self.pixels.split_off(split_at);

        (
            ColorBox::new(self.pixels, lower_seq),
            ColorBox::new(upper, upper_seq),
        )
    }

    /// Index of the first pixel of the upper half. Requires sorted pixels.
    fn split_point(&self, component: Component) -> usize {
        let len = self.pixels.len();
        let median = len / 2;
        let value = component.value(&self.pixels[median]);

        // First index holding `value`, and first index past it.
        let start = self.pixels.partition_point(|p| component.value(p) < value);
        let end = self.pixels.partition_point(|p| component.value(p) <= value);

        match (start > 0, end < len) {
            (true, true) => {
                if median - start <= end - median {
                    start
                } else {
                    end
                }
            }
            (true, false) => start,
            // The channel range is non-zero, so `value` cannot span the whole box.
            _ => end,
        }
    }
}

impl PartialEq for ColorBox {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ColorBox {}

impl Ord for ColorBox {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority()
            .cmp(&other.priority())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ColorBox {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// =============================================================================
// Quantizer
// =============================================================================

/// Median-cut quantizer producing at most `max_colors` colors.
///
/// # Example
///
/// ```
/// use palette_server::palette::{ColorQuantizer, Rgb};
///
/// let pixels = vec![Rgb::new(255, 0, 0); 10]
///     .into_iter()
///     .chain(vec![Rgb::new(0, 0, 255); 5])
///     .collect::<Vec<_>>();
///
/// let palette = ColorQuantizer::new(4).unwrap().quantize(&pixels).unwrap();
/// assert_eq!(palette.colors(), &[Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ColorQuantizer {
    max_colors: usize,
}

impl ColorQuantizer {
    /// Create a quantizer for `max_colors` colors.
    ///
    /// Fails with [`QuantizeError::InvalidColorCount`] outside 2-20. A single
    /// dominant color is not a palette request; see
    /// [`PaletteService::dominant_color`](crate::service::PaletteService::dominant_color).
    pub fn new(max_colors: usize) -> Result<Self, QuantizeError> {
        if !is_valid_color_count(max_colors) {
            return Err(QuantizeError::InvalidColorCount { count: max_colors });
        }
        Ok(Self { max_colors })
    }

    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    /// Reduce `pixels` to an ordered palette.
    ///
    /// The palette has at most `max_colors` entries and never more than the
    /// number of distinct colors in the sample.
    pub fn quantize(&self, pixels: &[Rgb]) -> Result<Palette, QuantizeError> {
        let boxes = self.split_boxes(pixels)?;
        Ok(boxes.iter().map(ColorBox::average_color).collect::<Vec<_>>().into())
    }

    /// Run the box splitting and return the final boxes in palette order.
    pub fn split_boxes(&self, pixels: &[Rgb]) -> Result<Vec<ColorBox>, QuantizeError> {
        if pixels.is_empty() {
            return Err(QuantizeError::EmptyInput);
        }

        let mut queue = BinaryHeap::with_capacity(self.max_colors);
        let mut settled = Vec::new();
        let mut next_seq = 1;

        queue.push(ColorBox::new(pixels.to_vec(), 0));

        while queue.len() + settled.len() < self.max_colors {
            let Some(vbox) = queue.pop() else {
                break;
            };

            if !vbox.can_split() {
                settled.push(vbox);
                continue;
            }

            let (lower, upper) = vbox.split(next_seq, next_seq + 1);
            next_seq += 2;

            queue.push(lower);
            queue.push(upper);
        }

        let mut boxes: Vec<ColorBox> = settled.into_iter().chain(queue.into_vec()).collect();
        boxes.sort_by(|a, b| {
            b.population()
                .cmp(&a.population())
                .then_with(|| a.seq.cmp(&b.seq))
        });

        Ok(boxes)
    }
}

// =============================================================================
// Tests
// =============================================================================
