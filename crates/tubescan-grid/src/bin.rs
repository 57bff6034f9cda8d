use serde::{Deserialize, Serialize};

/// One cluster of detections along a single rack axis.
///
/// `min..=max` is an inclusive pixel interval. It only grows while detections
/// are accumulated; the one-time ranking pass then pads it by a margin and
/// clips it to the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bin {
    pub min: u32,
    pub max: u32,
    /// Position in sorted axis order, set by [`crate::BinRanker`].
    pub rank: Option<usize>,
    /// Absolute 0-based rack index, set by [`crate::SlotCalculator`].
    pub grid_id: Option<usize>,
}

impl Bin {
    /// New bin spanning exactly `lo..=hi`.
    pub fn spanning(lo: u32, hi: u32) -> Self {
        Self {
            min: lo.min(hi),
            max: lo.max(hi),
            rank: None,
            grid_id: None,
        }
    }

    /// Integer pixel center of the interval.
    #[inline]
    pub fn center(&self) -> u32 {
        self.min + (self.max - self.min) / 2
    }

    /// Whether `lo..=hi` lies inside the interval.
    #[inline]
    pub fn covers(&self, lo: u32, hi: u32) -> bool {
        self.min <= lo && hi <= self.max
    }

    /// Either extent falls inside the interval widened by `thresh` on both
    /// sides.
    pub(crate) fn accepts(&self, lo: u32, hi: u32, thresh: u32) -> bool {
        let low = self.min.saturating_sub(thresh);
        let high = self.max.saturating_add(thresh);
        (low..=high).contains(&lo) || (low..=high).contains(&hi)
    }

    /// Grow the interval to cover `lo..=hi`. Returns `true` if it changed.
    pub(crate) fn widen(&mut self, lo: u32, hi: u32) -> bool {
        let before = (self.min, self.max);
        self.min = self.min.min(lo);
        self.max = self.max.max(hi);
        before != (self.min, self.max)
    }
}
