use tubescan_core::Axis;

/// The observed geometry does not fit the physical rack layout.
///
/// Every variant is terminal for the current scan; callers are expected to
/// re-scan (different DPI, re-seated rack) rather than retry.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PositionCalcError {
    #[error(
        "{axis} edge check failed: first {axis} center {center}px with edge distance {edge_dist}px \
         crosses the image bound at {bound}px"
    )]
    EdgeOutOfBounds {
        axis: Axis,
        center: u32,
        edge_dist: u32,
        /// Image coordinate the rack would cross: `0` (left edge) for
        /// columns, the image height for rows.
        bound: u32,
    },
    #[error(
        "could not determine {axis} interval between ranks {lower_rank} and {upper_rank} \
         (distance {distance_in:.4} in)"
    )]
    AmbiguousSpacing {
        axis: Axis,
        lower_rank: usize,
        upper_rank: usize,
        distance_in: f64,
    },
    #[error("{axis} id {grid_id} is outside the rack (limit {limit})")]
    GridIdOutOfRange {
        axis: Axis,
        grid_id: usize,
        limit: usize,
    },
    #[error("position {label} already occupied by {existing:?}, cannot place {incoming:?}")]
    DuplicateOccupancy {
        row: usize,
        col: usize,
        label: String,
        existing: String,
        incoming: String,
    },
}

/// Errors returned by [`crate::GridResolver`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no barcodes decoded in image")]
    ImageInvalid,
    #[error("invalid scan resolution: {0} dpi")]
    InvalidDpi(u32),
    #[error("cell distance must be a positive number of inches, got {0}")]
    InvalidCellDistance(f64),
    /// A detection box reaches past the right or bottom edge of the image.
    #[error("detection {index} ({payload:?}) is not inside the {width}x{height} image")]
    DetectionOutOfBounds {
        index: usize,
        payload: String,
        width: u32,
        height: u32,
    },
    #[error(transparent)]
    PositionCalc(#[from] PositionCalcError),
}
