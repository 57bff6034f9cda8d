//! High-level facade crate for the `tubescan-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core geometry types (including `nalgebra::Point2` for
//!   building a [`Detection`]) and the grid position resolver
//! - the [`decode::SymbolDecoder`] and [`decode::Segmenter`] seams a scanner
//!   front end plugs its data-matrix decoder and blob finder into
//! - end-to-end helpers that decode sub-regions in parallel and resolve the
//!   result into an 8×12 rack table
//! - JSON config, input and report files used by the `tubescan` CLI
//!
//! ## Quickstart
//!
//! ```no_run
//! use tubescan::{io::DetectionsFile, scan, ScanConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = DetectionsFile::load_json("detections.json")?;
//! let cfg = ScanConfig::default();
//! let res = scan::resolve_detections(&input.detections, input.image, &cfg)?;
//! print!("{}", res.grid.to_csv(cfg.plate));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tubescan::core`: detections, image geometry, regions, rack constants, logger.
//! - `tubescan::grid`: bin accumulation, ranking, slot calculation, grid assembly.
//! - `tubescan::decode`: decoder/segmenter traits, per-DPI settings, parallel decoding.
//! - `tubescan::scan`: `scan_rack` and `resolve_detections`.
//! - `tubescan::io`: `ScanConfig`, `DetectionsFile`, `ScanReport`.

pub use tubescan_core as core;
pub use tubescan_grid as grid;

pub use nalgebra::Point2;
pub use tubescan_core::{Detection, GrayImageView, ImageInfo, Region};
pub use tubescan_grid::{
    GridResolver, PositionCalcError, RackGrid, Resolution, ResolveError, ResolverParams,
};

pub mod decode;
pub mod io;
pub mod scan;

pub use decode::{BlobPreset, DecodeSettings, Segmenter, SymbolDecoder, TubeType};
pub use io::{DetectionsFile, ScanConfig, ScanIoError, ScanReport};
pub use scan::{resolve_detections, scan_rack, ScanError, ScanOutcome};
