use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rack::{RACK_COLS, RACK_ROWS};

/// One of the two rack axes a detection is binned along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Horizontal bands; binned on the vertical (`y`) pixel extent.
    Row,
    /// Vertical bands; binned on the horizontal (`x`) pixel extent.
    Column,
}

impl Axis {
    /// Number of physical slots along this axis.
    #[inline]
    pub fn slots(self) -> usize {
        match self {
            Axis::Row => RACK_ROWS,
            Axis::Column => RACK_COLS,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}
