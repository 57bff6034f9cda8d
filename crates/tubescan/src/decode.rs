//! Symbol decoding seams and the per-DPI settings handed to them.
//!
//! Pixel-level work is done by external collaborators behind the
//! [`SymbolDecoder`] and [`Segmenter`] traits. This module only decides which
//! regions get decoded, runs them in parallel and brings the results back
//! into full-image coordinates in a fixed order.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tubescan_core::{Detection, GrayImageView, Region};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Default scan gap between decoder scan lines, in inches.
pub const DEFAULT_SCAN_GAP_IN: f64 = 0.085;
/// Default maximum deviation from a right angle for a symbol's corners, in degrees.
pub const DEFAULT_SQUARE_DEV_DEG: u32 = 15;
/// Default edge-strength threshold.
pub const DEFAULT_EDGE_THRESH: u32 = 5;
/// Default number of error corrections the decoder may apply.
pub const DEFAULT_CORRECTIONS: u32 = 10;

/// Smallest symbol edge, in inches. Slightly smaller than a standard tube symbol.
const MIN_EDGE_IN: f64 = 0.08;
/// Largest symbol edge, in inches. Slightly larger than a Nunc tube symbol.
const MAX_EDGE_IN: f64 = 0.18;

/// Tuning handed to a [`SymbolDecoder`] for one scan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodeSettings {
    pub scan_gap_in: f64,
    pub square_dev_deg: u32,
    pub edge_thresh: u32,
    pub corrections: u32,
    /// Smallest symbol edge in pixels.
    pub min_edge_px: u32,
    /// Largest symbol edge in pixels.
    pub max_edge_px: u32,
    /// `scan_gap_in` in pixels.
    pub scan_gap_px: u32,
}

impl DecodeSettings {
    /// Default tuning with pixel sizes derived for `dpi`.
    pub fn for_dpi(dpi: u32) -> Self {
        Self::with_tuning(
            dpi,
            DEFAULT_SCAN_GAP_IN,
            DEFAULT_SQUARE_DEV_DEG,
            DEFAULT_EDGE_THRESH,
            DEFAULT_CORRECTIONS,
        )
    }

    /// Explicit tuning with pixel sizes derived for `dpi`.
    ///
    /// Pixel values are truncated, not rounded.
    pub fn with_tuning(
        dpi: u32,
        scan_gap_in: f64,
        square_dev_deg: u32,
        edge_thresh: u32,
        corrections: u32,
    ) -> Self {
        let dpi = f64::from(dpi);
        Self {
            scan_gap_in,
            square_dev_deg,
            edge_thresh,
            corrections,
            min_edge_px: (MIN_EDGE_IN * dpi) as u32,
            max_edge_px: (MAX_EDGE_IN * dpi) as u32,
            scan_gap_px: (scan_gap_in * dpi) as u32,
        }
    }
}

/// Kind of tube in the rack; Nunc tubes carry larger symbols.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TubeType {
    #[default]
    Standard,
    Nunc,
}

/// Blob segmentation tuning for one DPI and tube type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobPreset {
    /// Binarisation threshold.
    pub threshold: u8,
    /// Blobs with a smaller pixel area are dropped.
    pub min_blob_area: u32,
    /// Morphological filter rounds applied before blob extraction.
    pub rounds: u32,
    /// Pixels added around every blob before decoding.
    pub border: u32,
}

impl BlobPreset {
    /// Tuned preset for a 300, 400 or 600 DPI scan. Other resolutions use
    /// the 300 DPI values.
    pub fn for_dpi(dpi: u32, tube: TubeType) -> Self {
        let (threshold, min_blob_area, rounds, border) = match (tube, dpi) {
            (TubeType::Standard, 600) => (54, 2400, 4, 14),
            (TubeType::Standard, 400) => (50, 1900, 3, 4),
            (TubeType::Standard, _) => (55, 840, 2, 3),
            (TubeType::Nunc, 600) => (120, 5000, 10, 0),
            (TubeType::Nunc, 400) => (120, 3000, 10, 0),
            (TubeType::Nunc, _) => (110, 2000, 8, 0),
        };
        Self {
            threshold,
            min_blob_area,
            rounds,
            border,
        }
    }
}

/// Decodes data-matrix symbols inside one region of a scan.
///
/// Implementations must be deterministic for a given input: the detections
/// they return, and their order, feed an order-sensitive resolver.
pub trait SymbolDecoder {
    /// Decode every symbol found in `region` of `image`.
    ///
    /// Returned coordinates are relative to the region origin.
    fn decode_region(
        &self,
        image: &GrayImageView<'_>,
        region: Region,
        settings: &DecodeSettings,
    ) -> Vec<Detection>;
}

/// Splits a scan into candidate tube regions before decoding.
pub trait Segmenter {
    /// Raw blob rectangles, in the order they should be decoded.
    fn segment(&self, image: &GrayImageView<'_>, preset: &BlobPreset) -> Vec<Region>;
}

/// Regions to decode: the whole image without a segmenter, otherwise every
/// non-empty blob grown by the preset border and clipped to the image.
pub fn plan_regions(
    image: &GrayImageView<'_>,
    segmenter: Option<&dyn Segmenter>,
    preset: &BlobPreset,
) -> Vec<Region> {
    let Some(segmenter) = segmenter else {
        return vec![image.bounds()];
    };

    let regions: Vec<Region> = segmenter
        .segment(image, preset)
        .into_iter()
        .filter(|blob| !blob.is_empty())
        .map(|blob| blob.padded(preset.border, image.width, image.height))
        .filter(|r| !r.is_empty())
        .collect();
    log::debug!("segmented {} tube regions", regions.len());
    regions
}

/// Decode `regions` in parallel and return all detections in full-image
/// coordinates.
///
/// The result is ordered region by region, in the order of `regions`, and in
/// decoder order within a region, regardless of how the work was scheduled.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(regions = regions.len()))
)]
pub fn decode_regions<D>(
    image: &GrayImageView<'_>,
    regions: &[Region],
    decoder: &D,
    settings: &DecodeSettings,
) -> Vec<Detection>
where
    D: SymbolDecoder + Sync + ?Sized,
{
    let per_region: Vec<Vec<Detection>> = regions
        .par_iter()
        .map(|region| {
            decoder
                .decode_region(image, *region, settings)
                .iter()
                .map(|d| d.offset_by(region.x, region.y))
                .collect()
        })
        .collect();

    for (i, found) in per_region.iter().enumerate() {
        log::trace!("region {i}: {} symbols", found.len());
    }
    per_region.into_iter().flatten().collect()
}

/// Drop second reads of the same physical tube.
///
/// Overlapping regions can decode one tube twice. A detection is a repeat
/// when an earlier kept detection carries the same payload and its box
/// overlaps; the first read wins. The same payload at a different place is
/// kept, so the resolver still sees both tubes.
pub fn drop_repeated_reads(detections: Vec<Detection>) -> Vec<Detection> {
    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    let mut by_payload: HashMap<String, Vec<usize>> = HashMap::new();
    for d in detections {
        let earlier = by_payload.entry(d.payload().to_owned()).or_default();
        if earlier.iter().any(|&i| boxes_overlap(&kept[i], &d)) {
            log::debug!("dropping repeated read of {}", d.payload());
            continue;
        }
        earlier.push(kept.len());
        kept.push(d);
    }
    kept
}

fn boxes_overlap(a: &Detection, b: &Detection) -> bool {
    let (a_tl, a_br) = (a.top_left(), a.bottom_right());
    let (b_tl, b_br) = (b.top_left(), b.bottom_right());
    a_tl.x <= b_br.x && b_tl.x <= a_br.x && a_tl.y <= b_br.y && b_tl.y <= a_br.y
}
