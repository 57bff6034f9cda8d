use serde::{Deserialize, Serialize};

/// Center-to-center tube pitch of a standard 96-well rack, in inches.
pub const DEFAULT_CELL_DISTANCE_IN: f64 = 0.345;

/// Overlap tolerance used while accumulating bins, in pixels.
pub const BIN_THRESH_PX: u32 = 15;

/// Padding added to each bin after accumulation, in pixels.
pub const BIN_MARGIN_PX: u32 = 10;

/// Allowed deviation from a whole number of pitches, as a fraction of the pitch.
pub const CELL_DISTANCE_TOLERANCE: f64 = 0.4;

/// Configuration for the grid position resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverParams {
    /// Physical center-to-center tube spacing in inches.
    pub cell_distance_in: f64,
    /// Pixels by which a detection may miss a bin and still join it.
    pub bin_thresh_px: u32,
    /// Pixels added to each side of a bin once accumulation is done.
    pub bin_margin_px: u32,
    /// A bin gap matches `k` pitches when it is within
    /// `tolerance_frac * cell_distance_in` of `k * cell_distance_in`.
    ///
    /// Values at or above `0.5` make adjacent interval counts overlap.
    pub tolerance_frac: f64,
}

impl Default for ResolverParams {
    fn default() -> Self {
        Self {
            cell_distance_in: DEFAULT_CELL_DISTANCE_IN,
            bin_thresh_px: BIN_THRESH_PX,
            bin_margin_px: BIN_MARGIN_PX,
            tolerance_frac: CELL_DISTANCE_TOLERANCE,
        }
    }
}

impl ResolverParams {
    /// Default parameters with a different tube pitch.
    pub fn with_cell_distance(cell_distance_in: f64) -> Self {
        Self {
            cell_distance_in,
            ..Self::default()
        }
    }
}
