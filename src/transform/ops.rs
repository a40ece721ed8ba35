//! Batch transform operations.
//!
//! Transforms applied to a whole [`Batch`] between parsing and emission.
//! Each operation rewrites the pixel list in place; user ids travel with
//! their pixels, so reordering never renumbers anybody.

use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::models::Batch;

/// Highest valid coordinate on the default 64x64 canvas.
pub const DEFAULT_MIRROR_BOUND: u32 = 63;

/// All available batch transforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchTransform {
    /// Leave the batch untouched.
    Identity,

    /// Reflect every pixel across the canvas: `new = bound - old` on both
    /// axes. Coordinates beyond the bound abort the run.
    Mirror {
        #[serde(default = "default_mirror_bound")]
        bound: u32,
    },

    /// Stable sort by x coordinate, so think delays fire column by column.
    SortByX,
}

fn default_mirror_bound() -> u32 {
    DEFAULT_MIRROR_BOUND
}

impl BatchTransform {
    /// Apply this transform to a batch.
    pub fn apply(&self, batch: &mut Batch) -> TransformResult<()> {
        match self {
            BatchTransform::Identity => Ok(()),
            BatchTransform::Mirror { bound } => Self::apply_mirror(batch, *bound),
            BatchTransform::SortByX => {
                // sort_by_key is stable, ties keep their CSV order.
                batch.pixels.sort_by_key(|p| p.x);
                Ok(())
            }
        }
    }

    fn apply_mirror(batch: &mut Batch, bound: u32) -> TransformResult<()> {
        // Check every pixel first so a failed mirror leaves the batch untouched.
        for (row, pixel) in batch.pixels.iter().enumerate() {
            if pixel.x > bound || pixel.y > bound {
                return Err(TransformError::MirrorOutOfBounds {
                    row,
                    x: pixel.x,
                    y: pixel.y,
                    bound,
                });
            }
        }

        for pixel in &mut batch.pixels {
            pixel.x = bound - pixel.x;
            pixel.y = bound - pixel.y;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pixel;

    fn batch(pixels: Vec<Pixel>) -> Batch {
        Batch::from_pixels("test", 1, pixels)
    }

    #[test]
    fn test_identity_leaves_batch_unchanged() {
        let mut b = batch(vec![Pixel::new(1, 2, "#fff", 1), Pixel::new(3, 4, "#000", 2)]);
        let before = b.pixels.clone();

        BatchTransform::Identity.apply(&mut b).unwrap();

        assert_eq!(b.pixels, before);
    }

    #[test]
    fn test_mirror_reflects_both_axes() {
        let mut b = batch(vec![Pixel::new(0, 0, "#fff", 1), Pixel::new(63, 10, "#000", 2)]);

        BatchTransform::Mirror { bound: 63 }.apply(&mut b).unwrap();

        assert_eq!((b.pixels[0].x, b.pixels[0].y), (63, 63));
        assert_eq!((b.pixels[1].x, b.pixels[1].y), (0, 53));
        // Colors and user ids ride along untouched.
        assert_eq!(b.pixels[0].color, "#fff");
        assert_eq!(b.pixels[1].user_id, 2);
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        let original = vec![Pixel::new(5, 20, "red", 1), Pixel::new(40, 63, "blue", 2)];
        let mut b = batch(original.clone());

        let mirror = BatchTransform::Mirror { bound: 63 };
        mirror.apply(&mut b).unwrap();
        mirror.apply(&mut b).unwrap();

        assert_eq!(b.pixels, original);
    }

    #[test]
    fn test_mirror_custom_bound() {
        let mut b = batch(vec![Pixel::new(0, 31, "#fff", 1)]);

        BatchTransform::Mirror { bound: 31 }.apply(&mut b).unwrap();

        assert_eq!((b.pixels[0].x, b.pixels[0].y), (31, 0));
    }

    #[test]
    fn test_mirror_out_of_bounds_aborts() {
        let mut b = batch(vec![Pixel::new(1, 1, "#fff", 1), Pixel::new(70, 2, "#000", 2)]);
        let before = b.pixels.clone();

        let err = BatchTransform::Mirror { bound: 63 }.apply(&mut b).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("row 1"));
        assert!(msg.contains("(70, 2)"));
        // Failed mirror must not leave the batch half-reflected.
        assert_eq!(b.pixels, before);
    }

    #[test]
    fn test_sort_by_x_is_stable() {
        let mut b = batch(vec![
            Pixel::new(5, 0, "#aaa", 1),
            Pixel::new(2, 0, "#bbb", 2),
            Pixel::new(5, 9, "#ccc", 3),
            Pixel::new(2, 1, "#ddd", 4),
        ]);

        BatchTransform::SortByX.apply(&mut b).unwrap();

        let order: Vec<u64> = b.pixels.iter().map(|p| p.user_id).collect();
        // Equal x keeps CSV order: both 2s before both 5s, 2->4 and 1->3.
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(BatchTransform::Mirror { bound: 63 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "mirror", "bound": 63}));

        let parsed: BatchTransform = serde_json::from_str(r#"{"type": "sort_by_x"}"#).unwrap();
        assert_eq!(parsed, BatchTransform::SortByX);

        // Bound falls back to the canvas default when omitted.
        let parsed: BatchTransform = serde_json::from_str(r#"{"type": "mirror"}"#).unwrap();
        assert_eq!(parsed, BatchTransform::Mirror { bound: 63 });
    }
}
