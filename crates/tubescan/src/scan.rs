//! End-to-end rack scan: regions -> parallel decode -> resolver.

use crate::decode::{decode_regions, drop_repeated_reads, plan_regions, Segmenter, SymbolDecoder};
use crate::io::ScanConfig;
use tubescan_core::{Detection, GrayImageView, ImageInfo, Region};
use tubescan_grid::{GridResolver, Resolution, ResolveError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the scan helpers.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("invalid plate number {0} (expected 1 to 5)")]
    InvalidPlateNumber(u8),

    #[error("invalid scan resolution {0} dpi")]
    InvalidDpi(u32),

    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Everything a successful scan produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanOutcome {
    /// Regions that were decoded, in decode order.
    pub regions: Vec<Region>,
    /// Detections passed to the resolver, in arrival order.
    pub detections: Vec<Detection>,
    pub resolution: Resolution,
}

/// Wrap a raw grayscale buffer, checking its length.
pub fn gray_view_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<GrayImageView<'_>, ScanError> {
    GrayImageView::new(width, height, pixels).ok_or(ScanError::InvalidGrayBuffer {
        expected: width as usize * height as usize,
        got: pixels.len(),
    })
}

/// Decode and resolve one rack image scanned at `dpi`.
///
/// Without a segmenter the whole image is decoded as one region. A tube read
/// again by an overlapping region is dropped before resolution, keeping the
/// first read in region order.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image, decoder, segmenter, config),
        fields(width = image.width, height = image.height, plate = config.plate)
    )
)]
pub fn scan_rack<D>(
    image: &GrayImageView<'_>,
    dpi: u32,
    decoder: &D,
    segmenter: Option<&dyn Segmenter>,
    config: &ScanConfig,
) -> Result<ScanOutcome, ScanError>
where
    D: SymbolDecoder + Sync + ?Sized,
{
    config.validate()?;
    if dpi == 0 {
        return Err(ScanError::InvalidDpi(dpi));
    }

    let regions = plan_regions(image, segmenter, &config.blob_preset(dpi));
    let settings = config.decode_settings(dpi);
    let decoded = decode_regions(image, &regions, decoder, &settings);
    let detections = drop_repeated_reads(decoded);
    log::info!(
        "decoded {} tubes from {} regions",
        detections.len(),
        regions.len()
    );

    let resolution = resolve_detections(&detections, image.info(dpi), config)?;
    Ok(ScanOutcome {
        regions,
        detections,
        resolution,
    })
}

/// Resolve already-decoded detections with the config's resolver parameters.
pub fn resolve_detections(
    detections: &[Detection],
    image: ImageInfo,
    config: &ScanConfig,
) -> Result<Resolution, ScanError> {
    config.validate()?;
    if image.dpi == 0 {
        return Err(ScanError::InvalidDpi(image.dpi));
    }

    let resolver = GridResolver::new(config.resolver.clone());
    let resolution = resolver.resolve(detections, image).map_err(|err| {
        log::warn!("rack position calculation failed: {err}");
        err
    })?;
    log::info!(
        "resolved {} of {} tubes",
        resolution.grid.filled(),
        detections.len()
    );
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{BlobPreset, DecodeSettings};
    use nalgebra::Point2;
    use tubescan_grid::PositionCalcError;

    /// Returns a fixed symbol list for the whole image and nothing for other
    /// regions.
    struct Canned(Vec<Detection>);

    impl SymbolDecoder for Canned {
        fn decode_region(
            &self,
            image: &GrayImageView<'_>,
            region: Region,
            _settings: &DecodeSettings,
        ) -> Vec<Detection> {
            if region == image.bounds() {
                self.0.clone()
            } else {
                Vec::new()
            }
        }
    }

    struct NoBlobs;

    impl Segmenter for NoBlobs {
        fn segment(&self, _image: &GrayImageView<'_>, _preset: &BlobPreset) -> Vec<Region> {
            Vec::new()
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
    fn buffer_length_is_checked() {
        let pixels = vec![0u8; 10];
        assert!(matches!(
            gray_view_from_slice(4, 3, &pixels),
            Err(ScanError::InvalidGrayBuffer {
                expected: 12,
                got: 10
            })
        ));
    }

    #[test]
    fn whole_image_scan_resolves_tubes() {
        let pixels = vec![0u8; 1400 * 1000];
        let image = gray_view_from_slice(1400, 1000, &pixels).expect("view");
        let decoder = Canned(vec![
            tube("A", 1300, 100),
            tube("B", 1196, 100),
            tube("A", 1300, 100),
        ]);

        let outcome = scan_rack(&image, 300, &decoder, None, &ScanConfig::default())
            .expect("scan");
        assert_eq!(outcome.regions, vec![image.bounds()]);
        assert_eq!(outcome.detections.len(), 2);
        assert_eq!(outcome.resolution.grid.get(0, 0), Some("A"));
        assert_eq!(outcome.resolution.grid.get(0, 1), Some("B"));
    }

    #[test]
    fn equal_labels_in_two_cells_both_reach_the_rack() {
        let pixels = vec![0u8; 1400 * 1000];
        let image = gray_view_from_slice(1400, 1000, &pixels).expect("view");
        let decoder = Canned(vec![tube("SAME", 1300, 100), tube("SAME", 1300, 204)]);

        let outcome = scan_rack(&image, 300, &decoder, None, &ScanConfig::default())
            .expect("scan");
        assert_eq!(outcome.detections.len(), 2);
        let grid = &outcome.resolution.grid;
        assert_eq!(grid.filled(), 2);
        assert_eq!(grid.get(0, 0), Some("SAME"));
        assert_eq!(grid.get(1, 0), Some("SAME"));
    }

    #[test]
    fn two_labels_in_one_cell_still_collide() {
        let pixels = vec![0u8; 1400 * 1000];
        let image = gray_view_from_slice(1400, 1000, &pixels).expect("view");
        let decoder = Canned(vec![tube("A", 1300, 100), tube("B", 1302, 101)]);

        let err = scan_rack(&image, 300, &decoder, None, &ScanConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Resolve(ResolveError::PositionCalc(
                PositionCalcError::DuplicateOccupancy { .. }
            ))
        ));
    }

    #[test]
    fn nothing_decoded_is_an_invalid_image() {
        let pixels = vec![0u8; 64 * 64];
        let image = gray_view_from_slice(64, 64, &pixels).expect("view");
        let decoder = Canned(vec![tube("A", 40, 40)]);

        let err = scan_rack(&image, 300, &decoder, Some(&NoBlobs), &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::Resolve(ResolveError::ImageInvalid)));
    }

    #[test]
    fn plate_and_dpi_are_validated_before_decoding() {
        let pixels = vec![0u8; 16];
        let image = gray_view_from_slice(4, 4, &pixels).expect("view");
        let decoder = Canned(Vec::new());

        let cfg = ScanConfig {
            plate: 9,
            ..ScanConfig::default()
        };
        assert!(matches!(
            scan_rack(&image, 300, &decoder, None, &cfg),
            Err(ScanError::InvalidPlateNumber(9))
        ));
        assert!(matches!(
            scan_rack(&image, 0, &decoder, None, &ScanConfig::default()),
            Err(ScanError::InvalidDpi(0))
        ));
    }

    #[test]
    fn resolver_failures_pass_through() {
        let image = ImageInfo {
            width: 1400,
            height: 1000,
            dpi: 300,
        };
        let err = resolve_detections(&[tube("A", 900, 100)], image, &ScanConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ScanError::Resolve(ResolveError::PositionCalc(
                PositionCalcError::EdgeOutOfBounds { .. }
            ))
        ));
        assert!(err.to_string().contains("column"));
    }
}
