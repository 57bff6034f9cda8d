use serde::{Deserialize, Serialize};
use tubescan_core::{Axis, Detection};

use crate::bin::Bin;
use crate::observer::ResolveObserver;

/// Bins of one axis plus the bin index each detection was assigned to.
///
/// `members[i]` is the index into `bins` for the `i`-th detection of the
/// scan. Bins are an arena owned by this value; detections only hold indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisBins {
    pub axis: Axis,
    pub bins: Vec<Bin>,
    pub members: Vec<usize>,
}

impl AxisBins {
    /// Bin assigned to detection `detection`.
    #[inline]
    pub fn bin_of(&self, detection: usize) -> Option<&Bin> {
        self.members.get(detection).and_then(|&b| self.bins.get(b))
    }
}

/// Greedy first-match clustering of detections along one axis.
///
/// Detections are processed in arrival order. A detection joins the first
/// bin (in creation order) whose interval, widened by `thresh` pixels,
/// contains either of its extents; otherwise it starts a new bin. Existing
/// bins are never merged, so the result depends on the input order.
#[derive(Clone, Debug)]
pub struct BinAccumulator {
    axis: Axis,
    thresh: u32,
    bins: Vec<Bin>,
    members: Vec<usize>,
}

impl BinAccumulator {
    pub fn new(axis: Axis, thresh: u32) -> Self {
        Self {
            axis,
            thresh,
            bins: Vec::new(),
            members: Vec::new(),
        }
    }

    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[inline]
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Assign one detection to a bin, returning the bin index.
    pub fn push(&mut self, detection: &Detection, observer: &mut dyn ResolveObserver) -> usize {
        let (lo, hi) = detection.extent(self.axis);

        let hit = self
            .bins
            .iter()
            .position(|bin| bin.accepts(lo, hi, self.thresh));

        let index = match hit {
            Some(index) => {
                let bin = &mut self.bins[index];
                if bin.widen(lo, hi) {
                    log::trace!(
                        "{} bin {index} widened to ({}, {})",
                        self.axis,
                        bin.min,
                        bin.max
                    );
                    observer.bin_widened(self.axis, index, bin);
                }
                index
            }
            None => {
                let index = self.bins.len();
                let bin = Bin::spanning(lo, hi);
                log::trace!("new {} bin {index}: ({lo}, {hi})", self.axis);
                observer.bin_created(self.axis, index, &bin);
                self.bins.push(bin);
                index
            }
        };

        self.members.push(index);
        index
    }

    /// Accumulate a whole detection sequence.
    pub fn extend(&mut self, detections: &[Detection], observer: &mut dyn ResolveObserver) {
        for detection in detections {
            self.push(detection, observer);
        }
    }

    pub fn finish(self) -> AxisBins {
        AxisBins {
            axis: self.axis,
            bins: self.bins,
            members: self.members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NoopObserver;
    use nalgebra::Point2;

    fn det(name: &str, x0: u32, y0: u32, x1: u32, y1: u32) -> Detection {
        Detection::new(name, Point2::new(x0, y0), Point2::new(x1, y1))
    }

    fn accumulate(axis: Axis, detections: &[Detection]) -> AxisBins {
        let mut acc = BinAccumulator::new(axis, 15);
        acc.extend(detections, &mut NoopObserver);
        acc.finish()
    }

    #[test]
    fn every_detection_is_covered_by_its_bin() {
        let detections = vec![
            det("a", 100, 100, 140, 140),
            det("b", 205, 98, 246, 139),
            det("c", 103, 204, 144, 243),
            det("d", 95, 310, 137, 350),
        ];
        for axis in [Axis::Row, Axis::Column] {
            let bins = accumulate(axis, &detections);
            assert_eq!(bins.members.len(), detections.len());
            for (i, d) in detections.iter().enumerate() {
                let (lo, hi) = d.extent(axis);
                let bin = bins.bin_of(i).expect("assigned bin");
                assert!(bin.covers(lo, hi), "{axis} bin {bin:?} misses {lo}..{hi}");
            }
        }
        assert_eq!(accumulate(Axis::Column, &detections).bins.len(), 2);
        assert_eq!(accumulate(Axis::Row, &detections).bins.len(), 3);
    }

    #[test]
    fn first_match_wins_and_bins_are_not_merged() {
        // Two separate column bins, then a detection touching both.
        let detections = vec![
            det("left", 100, 0, 140, 40),
            det("right", 170, 0, 210, 40),
            det("bridge", 150, 100, 160, 140),
        ];
        let bins = accumulate(Axis::Column, &detections);
        assert_eq!(bins.bins.len(), 2);
        assert_eq!(bins.members, vec![0, 1, 0]);
        assert_eq!((bins.bins[0].min, bins.bins[0].max), (100, 160));
        assert_eq!((bins.bins[1].min, bins.bins[1].max), (170, 210));
    }

    #[test]
    fn arrival_order_decides_borderline_membership() {
        let a = det("a", 100, 0, 140, 40);
        let b = det("b", 150, 0, 190, 40);
        let c = det("c", 200, 0, 240, 40);

        let forward = accumulate(Axis::Column, &[a.clone(), b.clone(), c.clone()]);
        assert_eq!(forward.bins.len(), 1);

        let reordered = accumulate(Axis::Column, &[a, c, b]);
        assert_eq!(reordered.bins.len(), 2);
        assert_eq!(reordered.members, vec![0, 1, 0]);
    }

    #[test]
    fn observer_sees_creation_and_widening() {
        #[derive(Default)]
        struct Counts {
            created: usize,
            widened: usize,
        }
        impl ResolveObserver for Counts {
            fn bin_created(&mut self, _axis: Axis, _index: usize, _bin: &Bin) {
                self.created += 1;
            }
            fn bin_widened(&mut self, _axis: Axis, _index: usize, _bin: &Bin) {
                self.widened += 1;
            }
        }

        let mut counts = Counts::default();
        let mut acc = BinAccumulator::new(Axis::Row, 15);
        acc.extend(
            &[
                det("a", 0, 100, 40, 140),
                det("b", 100, 100, 140, 140),
                det("c", 200, 95, 240, 145),
            ],
            &mut counts,
        );
        assert_eq!(counts.created, 1);
        assert_eq!(counts.widened, 1);
    }
}
