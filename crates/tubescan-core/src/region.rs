use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle inside a scan image.
///
/// Used for pre-segmented sub-regions that are decoded independently.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Region covering a whole `width × height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grow the region by `border` pixels on every side and clip it to an
    /// `image_width × image_height` image.
    ///
    /// The far edge is clipped to the last pixel (`extent - 1`), so a padded
    /// region never touches the image's final row or column.
    pub fn padded(&self, border: u32, image_width: u32, image_height: u32) -> Self {
        let x = self.x.saturating_sub(border);
        let y = self.y.saturating_sub(border);
        let mut width = self.width.saturating_add(self.x - x).saturating_add(border);
        let mut height = self.height.saturating_add(self.y - y).saturating_add(border);

        let last_x = image_width.saturating_sub(1);
        let last_y = image_height.saturating_sub(1);
        if x.saturating_add(width) >= image_width {
            width = last_x.saturating_sub(x);
        }
        if y.saturating_add(height) >= image_height {
            height = last_y.saturating_sub(y);
        }
        Self {
            x,
            y,
            width,
            height,
        }
    }
}
