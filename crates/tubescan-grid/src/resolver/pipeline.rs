use tubescan_core::{Axis, Detection, ImageInfo};

use super::{PlacedDetection, Resolution, ResolveError, ResolverParams};
use crate::accumulator::{AxisBins, BinAccumulator};
use crate::assembler::GridAssembler;
use crate::observer::{NoopObserver, ResolveObserver};
use crate::ranking::{rank_order, BinRanker};
use crate::slots::SlotCalculator;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Resolves decoded tube symbols into rack positions.
///
/// One call owns all of its working state; a resolver can be shared between
/// threads and reused across scans.
#[derive(Clone, Debug, Default)]
pub struct GridResolver {
    params: ResolverParams,
}

impl GridResolver {
    pub fn new(params: ResolverParams) -> Self {
        Self { params }
    }

    /// Resolver parameters.
    #[inline]
    pub fn params(&self) -> &ResolverParams {
        &self.params
    }

    /// Resolve one scan.
    ///
    /// `detections` must be in the scan's fixed arrival order: sub-regions in
    /// the order they were segmented, detections within a region in decoder
    /// order. Bin accumulation is order-sensitive, so the same set in a
    /// different order may resolve differently.
    pub fn resolve(
        &self,
        detections: &[Detection],
        image: ImageInfo,
    ) -> Result<Resolution, ResolveError> {
        self.resolve_observed(detections, image, &mut NoopObserver)
    }

    /// Same as [`GridResolver::resolve`], reporting intermediate steps to
    /// `observer`.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, detections, observer),
            fields(detections = detections.len(), width = image.width, height = image.height, dpi = image.dpi)
        )
    )]
    pub fn resolve_observed(
        &self,
        detections: &[Detection],
        image: ImageInfo,
        observer: &mut dyn ResolveObserver,
    ) -> Result<Resolution, ResolveError> {
        if detections.is_empty() {
            return Err(ResolveError::ImageInvalid);
        }
        if image.dpi == 0 {
            return Err(ResolveError::InvalidDpi(image.dpi));
        }
        let cell_distance = self.params.cell_distance_in;
        if !cell_distance.is_finite() || cell_distance <= 0.0 {
            return Err(ResolveError::InvalidCellDistance(cell_distance));
        }
        check_inside(detections, image)?;

        let mut rows = self.accumulate(Axis::Row, detections, observer);
        let mut cols = self.accumulate(Axis::Column, detections, observer);

        let ranker = BinRanker::new(self.params.bin_margin_px);
        ranker.rank(&mut cols, image.extent(Axis::Column), observer);
        ranker.rank(&mut rows, image.extent(Axis::Row), observer);
        let order = rank_order(&rows, &cols);

        SlotCalculator::new(image.dpi, &self.params).assign(
            &mut cols.bins,
            &mut rows.bins,
            image.height,
            observer,
        )?;

        let grid = GridAssembler.assemble(detections, &order, &rows, &cols, observer)?;

        let placed = order
            .iter()
            .map(|&i| {
                let row_rank = rows.members[i];
                let col_rank = cols.members[i];
                PlacedDetection {
                    detection: detections[i].clone(),
                    row_rank,
                    col_rank,
                    row: rows.bins[row_rank].grid_id.unwrap_or_default(),
                    col: cols.bins[col_rank].grid_id.unwrap_or_default(),
                }
            })
            .collect();

        log::debug!(
            "resolved {} barcodes into {} rows x {} columns",
            detections.len(),
            rows.bins.len(),
            cols.bins.len()
        );

        Ok(Resolution {
            grid,
            placed,
            row_bins: rows.bins,
            col_bins: cols.bins,
        })
    }

    fn accumulate(
        &self,
        axis: Axis,
        detections: &[Detection],
        observer: &mut dyn ResolveObserver,
    ) -> AxisBins {
        let mut acc = BinAccumulator::new(axis, self.params.bin_thresh_px);
        acc.extend(detections, observer);
        acc.finish()
    }
}

/// Every box must end before the image's last column and row.
fn check_inside(detections: &[Detection], image: ImageInfo) -> Result<(), ResolveError> {
    let outside = detections.iter().position(|d| {
        let br = d.bottom_right();
        br.x >= image.width || br.y >= image.height
    });
    match outside {
        Some(index) => {
            log::debug!("detection {index} lies outside the image");
            Err(ResolveError::DetectionOutOfBounds {
                index,
                payload: detections[index].payload().to_owned(),
                width: image.width,
                height: image.height,
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PositionCalcError;
    use nalgebra::Point2;

    fn image() -> ImageInfo {
        ImageInfo {
            width: 1400,
            height: 1000,
            dpi: 300,
        }
    }

    fn tube(payload: &str, cx: u32, cy: u32) -> Detection {
        Detection::new(
            payload,
            Point2::new(cx - 20, cy - 20),
            Point2::new(cx + 20, cy + 20),
        )
    }

    #[test]
    fn empty_scan_is_invalid_image() {
        let err = GridResolver::default().resolve(&[], image()).unwrap_err();
        assert_eq!(err, ResolveError::ImageInvalid);
    }

    #[test]
    fn zero_dpi_is_rejected() {
        let img = ImageInfo { dpi: 0, ..image() };
        let err = GridResolver::default()
            .resolve(&[tube("a", 1300, 100)], img)
            .unwrap_err();
        assert_eq!(err, ResolveError::InvalidDpi(0));
    }

    #[test]
    fn non_positive_cell_distance_is_rejected() {
        for pitch in [0.0, -0.345, f64::NAN] {
            let resolver = GridResolver::new(ResolverParams::with_cell_distance(pitch));
            let err = resolver
                .resolve(&[tube("a", 1300, 100)], image())
                .unwrap_err();
            assert!(matches!(err, ResolveError::InvalidCellDistance(_)));
        }
    }

    #[test]
    fn boxes_past_the_image_edge_are_rejected() {
        let outside = Detection::new("x", Point2::new(1500, 100), Point2::new(1540, 140));
        let err = GridResolver::default()
            .resolve(&[tube("a", 1300, 100), outside], image())
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::DetectionOutOfBounds {
                index: 1,
                payload: "x".to_string(),
                width: 1400,
                height: 1000,
            }
        );

        // Touching the last row is fine; reaching the height is not.
        let last_row = Detection::new("y", Point2::new(1280, 959), Point2::new(1320, 999));
        let on_edge = Detection::new("z", Point2::new(1280, 960), Point2::new(1320, 1000));
        let resolver = GridResolver::default();
        assert!(!matches!(
            resolver.resolve(&[last_row], image()),
            Err(ResolveError::DetectionOutOfBounds { .. })
        ));
        assert!(matches!(
            resolver.resolve(&[on_edge], image()),
            Err(ResolveError::DetectionOutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn single_tube_lands_in_a1() {
        let res = GridResolver::default()
            .resolve(&[tube("only", 1300, 100)], image())
            .expect("resolve");
        assert_eq!(res.grid.get(0, 0), Some("only"));
        assert_eq!(res.placed.len(), 1);
        assert_eq!(res.row_bins[0].grid_id, Some(0));
        assert_eq!(res.col_bins[0].grid_id, Some(0));
    }

    #[test]
    fn placed_order_follows_row_then_column_rank() {
        let detections = vec![
            tube("r1-right", 1300, 204),
            tube("r0-left", 1196, 100),
            tube("r0-right", 1300, 100),
        ];
        let res = GridResolver::default()
            .resolve(&detections, image())
            .expect("resolve");
        let names: Vec<&str> = res.placed.iter().map(|p| p.detection.payload()).collect();
        assert_eq!(names, vec!["r0-left", "r0-right", "r1-right"]);
        assert_eq!(res.grid.get(0, 1), Some("r0-left"));
        assert_eq!(res.grid.get(1, 0), Some("r1-right"));
        assert_eq!(res.at(0, 0).map(|p| p.col_rank), Some(1));
    }

    #[test]
    fn error_converts_from_position_calc() {
        let err: ResolveError = PositionCalcError::GridIdOutOfRange {
            axis: Axis::Row,
            grid_id: 9,
            limit: 8,
        }
        .into();
        assert!(err.to_string().contains("row id 9"));
    }
}
