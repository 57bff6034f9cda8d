use tubescan_core::Axis;

use crate::bin::Bin;

/// Hook for diagnostics emitted while a scan is resolved.
///
/// Every method has an empty default, so observers implement only what they
/// need. The resolver also logs the same events through `log`.
pub trait ResolveObserver {
    /// A detection on `axis` matched no existing bin and started bin `index`.
    fn bin_created(&mut self, _axis: Axis, _index: usize, _bin: &Bin) {}

    /// Bin `index` on `axis` was widened to absorb a detection.
    fn bin_widened(&mut self, _axis: Axis, _index: usize, _bin: &Bin) {}

    /// Bins on `axis` were sorted, padded and ranked.
    fn bins_ranked(&mut self, _axis: Axis, _bins: &[Bin]) {}

    /// The gap between two adjacent ranked bins resolved to `interval` slots.
    fn interval_resolved(
        &mut self,
        _axis: Axis,
        _lower_rank: usize,
        _upper_rank: usize,
        _distance_in: f64,
        _interval: usize,
    ) {
    }

    /// A payload was written into the rack table.
    fn cell_filled(&mut self, _row: usize, _col: usize, _payload: &str) {}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ResolveObserver for NoopObserver {}
