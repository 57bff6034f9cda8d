//! Core types for locating data-matrix tubes in a rack scan.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete symbol decoder, scanner or image type.

mod axis;
mod detection;
mod image;
mod logger;
mod rack;
mod region;

pub use axis::Axis;
pub use detection::{Detection, ImageInfo};
pub use image::GrayImageView;
pub use rack::{rack_label, row_letter, RACK_COLS, RACK_ROWS};
pub use region::Region;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_file, init_with_level, LoggerError, DEFAULT_LOG_FILE};
