use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::axis::Axis;

/// One decoded data-matrix symbol with its pixel-space bounding box.
///
/// Detections are immutable once created. Coordinates are in the pixel frame
/// of the full scan image (`x` to the right, `y` down).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    payload: String,
    top_left: Point2<u32>,
    bottom_right: Point2<u32>,
}

impl Detection {
    /// Build a detection from two opposite box corners.
    ///
    /// The corners are normalised so that `top_left <= bottom_right` on both
    /// axes.
    pub fn new(payload: impl Into<String>, a: Point2<u32>, b: Point2<u32>) -> Self {
        Self {
            payload: payload.into(),
            top_left: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            bottom_right: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Build a detection from the four (possibly rotated) symbol corners
    /// reported by a decoder, using their axis-aligned bounding box.
    ///
    /// Negative coordinates are clamped to the image origin.
    pub fn from_corners(payload: impl Into<String>, corners: &[Point2<f32>; 4]) -> Self {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let px = |v: f32| v.round().max(0.0) as u32;
        Self::new(
            payload,
            Point2::new(px(min_x), px(min_y)),
            Point2::new(px(max_x), px(max_y)),
        )
    }

    #[inline]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    #[inline]
    pub fn top_left(&self) -> Point2<u32> {
        self.top_left
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<u32> {
        self.bottom_right
    }

    /// Low/high pixel extent along `axis`: top/bottom for rows, left/right
    /// for columns.
    #[inline]
    pub fn extent(&self, axis: Axis) -> (u32, u32) {
        match axis {
            Axis::Row => (self.top_left.y, self.bottom_right.y),
            Axis::Column => (self.top_left.x, self.bottom_right.x),
        }
    }

    /// Move a detection decoded inside a cropped sub-region into full-image
    /// coordinates. Coordinates saturate at `u32::MAX`.
    pub fn offset_by(&self, dx: u32, dy: u32) -> Self {
        Self {
            payload: self.payload.clone(),
            top_left: Point2::new(
                self.top_left.x.saturating_add(dx),
                self.top_left.y.saturating_add(dy),
            ),
            bottom_right: Point2::new(
                self.bottom_right.x.saturating_add(dx),
                self.bottom_right.y.saturating_add(dy),
            ),
        }
    }
}

/// Geometry of one scanned image, as reported by the acquisition stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Scan resolution in pixels per inch.
    pub dpi: u32,
}

impl ImageInfo {
    /// Pixel extent of the image along `axis` (height for rows, width for
    /// columns).
    #[inline]
    pub fn extent(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Row => self.height,
            Axis::Column => self.width,
        }
    }
}
