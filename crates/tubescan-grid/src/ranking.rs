use crate::accumulator::AxisBins;
use crate::observer::ResolveObserver;

/// Sorts the bins of one axis, pads them by a fixed margin and assigns ranks.
#[derive(Clone, Copy, Debug)]
pub struct BinRanker {
    margin: u32,
}

impl BinRanker {
    pub fn new(margin: u32) -> Self {
        Self { margin }
    }

    /// Rank `axis_bins` in place.
    ///
    /// Bins are sorted ascending by `(min, max)`; equal keys keep their
    /// creation order. Each bin is then padded by the margin, clipped to
    /// `[0, extent - 1]` without dropping below its own `min`, and given `rank = position`. Detection memberships
    /// are remapped to the sorted indices, so after this call a bin's index
    /// equals its rank.
    pub fn rank(&self, axis_bins: &mut AxisBins, extent: u32, observer: &mut dyn ResolveObserver) {
        let mut order: Vec<usize> = (0..axis_bins.bins.len()).collect();
        order.sort_by_key(|&i| (axis_bins.bins[i].min, axis_bins.bins[i].max));

        let mut remap = vec![0usize; order.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = new;
        }

        let last = extent.saturating_sub(1);
        let mut sorted: Vec<_> = order.iter().map(|&i| axis_bins.bins[i]).collect();
        for (rank, bin) in sorted.iter_mut().enumerate() {
            bin.min = bin.min.saturating_sub(self.margin);
            bin.max = bin.max.saturating_add(self.margin).min(last).max(bin.min);
            bin.rank = Some(rank);
            log::debug!(
                "{} bin {rank}: ({}, {}) center {}",
                axis_bins.axis,
                bin.min,
                bin.max,
                bin.center()
            );
        }

        for member in axis_bins.members.iter_mut() {
            *member = remap[*member];
        }
        axis_bins.bins = sorted;

        log::debug!("number of {} bins: {}", axis_bins.axis, axis_bins.bins.len());
        observer.bins_ranked(axis_bins.axis, &axis_bins.bins);
    }
}

/// Detection indices ordered by `(row rank, column rank)`.
///
/// Both axes must already be ranked. Detections sharing a cell keep their
/// arrival order.
pub fn rank_order(rows: &AxisBins, cols: &AxisBins) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.members.len()).collect();
    order.sort_by_key(|&i| (rows.members[i], cols.members[i]));
    order
}
