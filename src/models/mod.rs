//! Domain models for the pixelload pipeline.
//!
//! This module contains the core data structures carried through the pipeline:
//!
//! - [`Pixel`] - A single canvas pixel with its assigned virtual user
//! - [`Batch`] - A named list of pixels loaded from one CSV export
//!
//! The serialized field order of [`Pixel`] is the order payload lines are
//! written with, so tooling that diffs payload files sees stable output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Pixel
// =============================================================================

/// A single pixel to draw, tagged with the virtual user that will send it.
///
/// `x` and `y` are canvas coordinates with the origin at the top-left.
/// `color` is kept verbatim from the CSV; the canvas service accepts any
/// string it can resolve, so no normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    /// Horizontal canvas coordinate.
    pub x: u32,
    /// Vertical canvas coordinate.
    pub y: u32,
    /// Color value, e.g. `#ff0000` or `red`.
    pub color: String,
    /// Virtual user id assigned to this pixel.
    pub user_id: u64,
}

impl Pixel {
    /// Create a pixel with an explicit user id.
    pub fn new(x: u32, y: u32, color: impl Into<String>, user_id: u64) -> Self {
        Self {
            x,
            y,
            color: color.into(),
            user_id,
        }
    }
}

/// Matches `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` or a bare color name.
static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#([0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|[A-Za-z]+)$")
        .expect("Invalid color regex")
});

/// Whether a color cell looks like something a canvas would accept.
///
/// Only used for reporting. Odd colors are counted and surfaced in the run
/// summary, never rejected.
pub fn looks_like_color(value: &str) -> bool {
    COLOR_RE.is_match(value)
}

// =============================================================================
// Batch
// =============================================================================

/// A named batch of pixels parsed from one CSV export.
///
/// The name comes from the CSV file stem and ends up in scenario names and
/// the run summary. `start_user_id` records the offset the batch was
/// numbered from, so summaries can show which id range a batch occupies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Batch name, derived from the source file stem.
    pub name: String,
    /// First user id assigned to this batch.
    pub start_user_id: u64,
    /// Pixels in CSV row order.
    pub pixels: Vec<Pixel>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new(name: impl Into<String>, start_user_id: u64) -> Self {
        Self {
            name: name.into(),
            start_user_id,
            pixels: Vec::new(),
        }
    }

    /// Create a batch from already-numbered pixels.
    pub fn from_pixels(name: impl Into<String>, start_user_id: u64, pixels: Vec<Pixel>) -> Self {
        Self {
            name: name.into(),
            start_user_id,
            pixels,
        }
    }

    /// Number of pixels in the batch.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Whether the batch holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Count pixels whose color cell does not look like a color.
    pub fn odd_color_count(&self) -> usize {
        self.pixels
            .iter()
            .filter(|p| !looks_like_color(&p.color))
            .count()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_serializes_in_field_order() {
        let pixel = Pixel::new(3, 7, "#ff0000", 42);
        let json = serde_json::to_string(&pixel).unwrap();
        assert_eq!(json, r##"{"x":3,"y":7,"color":"#ff0000","user_id":42}"##);
    }

    #[test]
    fn test_pixel_roundtrip() {
        let pixel = Pixel::new(0, 63, "blue", 10_000);
        let json = serde_json::to_string(&pixel).unwrap();
        let back: Pixel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pixel);
    }

    #[test]
    fn test_looks_like_color() {
        assert!(looks_like_color("#fff"));
        assert!(looks_like_color("#ff00ff"));
        assert!(looks_like_color("#ff00ff80"));
        assert!(looks_like_color("rebeccapurple"));
        assert!(!looks_like_color("#ggg"));
        assert!(!looks_like_color("0xdeadbeef"));
        assert!(!looks_like_color(""));
        assert!(!looks_like_color("not a color"));
    }

    #[test]
    fn test_batch_odd_color_count() {
        let batch = Batch::from_pixels(
            "wave",
            1,
            vec![
                Pixel::new(0, 0, "#fff", 1),
                Pixel::new(1, 0, "???", 2),
                Pixel::new(2, 0, "teal", 3),
            ],
        );
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.odd_color_count(), 1);
    }
}
