use tubescan_core::{rack_label, Axis, Detection, RACK_COLS, RACK_ROWS};

use crate::accumulator::AxisBins;
use crate::grid::RackGrid;
use crate::observer::ResolveObserver;
use crate::resolver::PositionCalcError;

/// Writes payloads into the rack table from resolved bin ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridAssembler;

impl GridAssembler {
    /// Place every detection at `(row bin id, column bin id)`.
    ///
    /// `order` lists detection indices in the deterministic placement order
    /// (see [`crate::rank_order`]). Two detections landing in the same cell
    /// fail the whole scan; later ones are never silently dropped.
    pub fn assemble(
        &self,
        detections: &[Detection],
        order: &[usize],
        rows: &AxisBins,
        cols: &AxisBins,
        observer: &mut dyn ResolveObserver,
    ) -> Result<RackGrid, PositionCalcError> {
        let mut grid = RackGrid::new();

        for &i in order {
            let detection = &detections[i];
            let row = grid_id(rows, i, Axis::Row)?;
            let col = grid_id(cols, i, Axis::Column)?;
            let label = rack_label(row, col).unwrap_or_default();

            log::debug!("barcode {i} ({label}): {}", detection.payload());

            match grid.place(row, col, detection.payload()) {
                Ok(()) => observer.cell_filled(row, col, detection.payload()),
                Err(Some(existing)) => {
                    log::debug!("position ({label}) already occupied");
                    return Err(PositionCalcError::DuplicateOccupancy {
                        row,
                        col,
                        label,
                        existing,
                        incoming: detection.payload().to_owned(),
                    });
                }
                Err(None) => {
                    let (axis, grid_id, limit) = if row >= RACK_ROWS {
                        (Axis::Row, row, RACK_ROWS)
                    } else {
                        (Axis::Column, col, RACK_COLS)
                    };
                    return Err(PositionCalcError::GridIdOutOfRange {
                        axis,
                        grid_id,
                        limit,
                    });
                }
            }
        }

        Ok(grid)
    }
}

/// Resolved id of the bin detection `i` belongs to on one axis.
///
/// A bin without an id cannot occur after a successful slot calculation; it
/// is reported as out of range rather than panicking.
fn grid_id(bins: &AxisBins, i: usize, axis: Axis) -> Result<usize, PositionCalcError> {
    bins.bin_of(i)
        .and_then(|b| b.grid_id)
        .ok_or(PositionCalcError::GridIdOutOfRange {
            axis,
            grid_id: usize::MAX,
            limit: axis.slots(),
        })
}
