use serde::{Deserialize, Serialize};
use tubescan_core::Detection;

use crate::bin::Bin;
use crate::grid::RackGrid;

/// A detection together with the rack cell it was resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedDetection {
    pub detection: Detection,
    pub row_rank: usize,
    pub col_rank: usize,
    pub row: usize,
    pub col: usize,
}

/// Output of one successful resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub grid: RackGrid,
    /// Detections in placement order: ascending `(row_rank, col_rank)`.
    pub placed: Vec<PlacedDetection>,
    /// Ranked row bins; index equals rank.
    pub row_bins: Vec<Bin>,
    /// Ranked column bins; index equals rank.
    pub col_bins: Vec<Bin>,
}

impl Resolution {
    /// Detection resolved to `(row, col)`, if any.
    pub fn at(&self, row: usize, col: usize) -> Option<&PlacedDetection> {
        self.placed.iter().find(|p| p.row == row && p.col == col)
    }
}
