//! Grid position resolver for 12×8 tube racks.
//!
//! Turns an unordered set of decoded tube symbols, each with a pixel bounding
//! box, into absolute rack positions:
//! - per-axis clustering of detections into row/column bins,
//! - ranking and margin widening of the bins,
//! - inference of grid indices from the physical tube pitch and scan DPI,
//! - assembly of the final rack table with duplicate-occupancy checks.
//!
//! Symbol decoding and image handling live outside this crate.

mod accumulator;
mod assembler;
mod bin;
mod grid;
mod observer;
mod ranking;
mod resolver;
mod slots;

pub use accumulator::{AxisBins, BinAccumulator};
pub use assembler::GridAssembler;
pub use bin::Bin;
pub use grid::{GridShapeError, RackGrid};
pub use observer::{NoopObserver, ResolveObserver};
pub use ranking::{rank_order, BinRanker};
pub use resolver::{
    GridResolver, PlacedDetection, PositionCalcError, Resolution, ResolveError, ResolverParams,
};
pub use slots::SlotCalculator;

pub use tubescan_core::{Axis, Detection, ImageInfo, RACK_COLS, RACK_ROWS};
