use tubescan_core::{Axis, RACK_COLS, RACK_ROWS};

use crate::bin::Bin;
use crate::observer::ResolveObserver;
use crate::resolver::{PositionCalcError, ResolverParams};

/// Converts ranked bins into absolute rack indices using the physical pitch.
///
/// Columns are numbered from the right of the image: the highest-ranked
/// column bin is column 0 and ids grow as rank decreases. Rows are numbered
/// from the top: the lowest-ranked row bin is row 0. This matches the scanner
/// orientation the rack is placed in and must not be symmetrised.
#[derive(Clone, Copy, Debug)]
pub struct SlotCalculator {
    dpi: f64,
    cell_distance: f64,
    tolerance: f64,
}

impl SlotCalculator {
    pub fn new(dpi: u32, params: &ResolverParams) -> Self {
        Self {
            dpi: f64::from(dpi),
            cell_distance: params.cell_distance_in,
            tolerance: params.cell_distance_in * params.tolerance_frac,
        }
    }

    /// Pixel span covered by `pitches` tube pitches, truncated to whole pixels.
    #[inline]
    pub fn edge_distance(&self, pitches: usize) -> u32 {
        (pitches as f64 * self.cell_distance * self.dpi) as u32
    }

    /// Smallest `k` in `1..=max_k` with `|distance_in - k * pitch| < tolerance`.
    pub fn interval(&self, distance_in: f64, max_k: usize) -> Option<usize> {
        (1..=max_k).find(|&k| (distance_in - k as f64 * self.cell_distance).abs() < self.tolerance)
    }

    /// Assign `grid_id` to every ranked column and row bin.
    ///
    /// Checks run in a fixed order: column edge, row edge, column intervals,
    /// row intervals, then rack bounds (rows before columns). The first
    /// failure is returned.
    pub fn assign(
        &self,
        cols: &mut [Bin],
        rows: &mut [Bin],
        image_height: u32,
        observer: &mut dyn ResolveObserver,
    ) -> Result<(), PositionCalcError> {
        if let Some(first_col) = cols.last_mut() {
            // The 12th column must still fit left of the hypothesised first one.
            let edge_dist = self.edge_distance(RACK_COLS - 1);
            let center = first_col.center();
            log::debug!("first_col_center/{center} edge_distance/{edge_dist}");
            if center <= edge_dist {
                log::debug!("column edge check out of bounds");
                return Err(PositionCalcError::EdgeOutOfBounds {
                    axis: Axis::Column,
                    center,
                    edge_dist,
                    bound: 0,
                });
            }
            first_col.grid_id = Some(0);
        }

        if let Some(first_row) = rows.first_mut() {
            // The 8th row must still fit above the bottom of the image.
            let edge_dist = self.edge_distance(RACK_ROWS - 1);
            let center = first_row.center();
            log::debug!("first_row_center/{center} edge_distance/{edge_dist} height/{image_height}");
            if u64::from(center) + u64::from(edge_dist) >= u64::from(image_height) {
                log::debug!("row edge check out of bounds");
                return Err(PositionCalcError::EdgeOutOfBounds {
                    axis: Axis::Row,
                    center,
                    edge_dist,
                    bound: image_height,
                });
            }
            first_row.grid_id = Some(0);
        }

        log::debug!("cell distance error/{}", self.tolerance);

        for upper in (1..cols.len()).rev() {
            let lower = upper - 1;
            let k = self.gap(Axis::Column, &cols[lower], &cols[upper], lower, observer)?;
            let base = cols[upper].grid_id.unwrap_or(0);
            cols[lower].grid_id = Some(base + k);
        }

        for upper in 1..rows.len() {
            let lower = upper - 1;
            let k = self.gap(Axis::Row, &rows[lower], &rows[upper], lower, observer)?;
            let base = rows[lower].grid_id.unwrap_or(0);
            rows[upper].grid_id = Some(base + k);
        }

        check_bounds(Axis::Row, rows)?;
        check_bounds(Axis::Column, cols)?;
        Ok(())
    }

    fn gap(
        &self,
        axis: Axis,
        lower_bin: &Bin,
        upper_bin: &Bin,
        lower: usize,
        observer: &mut dyn ResolveObserver,
    ) -> Result<usize, PositionCalcError> {
        let upper = lower + 1;
        let pixels = i64::from(upper_bin.center()) - i64::from(lower_bin.center());
        let distance_in = pixels as f64 / self.dpi;

        let Some(k) = self.interval(distance_in, axis.slots() - 1) else {
            log::debug!("could not determine {axis} intervals: {axis} {upper}-{lower} distance/{distance_in}");
            return Err(PositionCalcError::AmbiguousSpacing {
                axis,
                lower_rank: lower,
                upper_rank: upper,
                distance_in,
            });
        };

        log::debug!("{axis} bin {upper}-{lower} distance/{distance_in} interval/{k}");
        observer.interval_resolved(axis, lower, upper, distance_in, k);
        Ok(k)
    }
}

fn check_bounds(axis: Axis, bins: &[Bin]) -> Result<(), PositionCalcError> {
    let limit = axis.slots();
    match bins.iter().filter_map(|b| b.grid_id).max() {
        Some(grid_id) if grid_id >= limit => Err(PositionCalcError::GridIdOutOfRange {
            axis,
            grid_id,
            limit,
        }),
        _ => Ok(()),
    }
}
