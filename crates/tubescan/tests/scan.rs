use tubescan::decode::{BlobPreset, DecodeSettings, Segmenter, SymbolDecoder};
use tubescan::scan::{gray_view_from_slice, scan_rack};
use tubescan::{Detection, GrayImageView, Point2, Region, ScanConfig, ScanError};

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 1000;
const DPI: u32 = 300;

fn truth() -> Vec<Detection> {
    let pitch = 0.345 * f64::from(DPI);
    let mut out = Vec::new();
    for row in 0..8usize {
        for col in 0..12usize {
            let cx = (1300.0 - col as f64 * pitch).round() as u32;
            let cy = (100.0 + row as f64 * pitch).round() as u32;
            out.push(Detection::new(
                format!("{}{}", char::from(b'A' + row as u8), col + 1),
                Point2::new(cx - 20, cy - 20),
                Point2::new(cx + 20, cy + 20),
            ));
        }
    }
    out
}

/// Reports every true symbol that lies fully inside the region, in
/// region-local coordinates.
struct GroundTruthDecoder(Vec<Detection>);

impl SymbolDecoder for GroundTruthDecoder {
    fn decode_region(
        &self,
        _image: &GrayImageView<'_>,
        region: Region,
        settings: &DecodeSettings,
    ) -> Vec<Detection> {
        assert_eq!(settings.min_edge_px, 24);
        self.0
            .iter()
            .filter(|d| {
                let (tl, br) = (d.top_left(), d.bottom_right());
                tl.x >= region.x
                    && tl.y >= region.y
                    && br.x < region.x + region.width
                    && br.y < region.y + region.height
            })
            .map(|d| {
                Detection::new(
                    d.payload(),
                    Point2::new(d.top_left().x - region.x, d.top_left().y - region.y),
                    Point2::new(d.bottom_right().x - region.x, d.bottom_right().y - region.y),
                )
            })
            .collect()
    }
}

/// One blob per tube plus a wide blob over the first row, which decodes the
/// first row a second time.
struct TubeBlobs(Vec<Region>);

impl TubeBlobs {
    fn from_truth(truth: &[Detection]) -> Self {
        let mut blobs: Vec<Region> = truth
            .iter()
            .map(|d| Region {
                x: d.top_left().x,
                y: d.top_left().y,
                width: d.bottom_right().x - d.top_left().x,
                height: d.bottom_right().y - d.top_left().y,
            })
            .collect();
        blobs.push(Region {
            x: 0,
            y: 40,
            width: WIDTH,
            height: 120,
        });
        Self(blobs)
    }
}

impl Segmenter for TubeBlobs {
    fn segment(&self, _image: &GrayImageView<'_>, preset: &BlobPreset) -> Vec<Region> {
        assert_eq!(preset.border, 3);
        self.0.clone()
    }
}

#[test]
fn segmented_parallel_scan_fills_rack() {
    let pixels = vec![0u8; (WIDTH * HEIGHT) as usize];
    let image = gray_view_from_slice(WIDTH, HEIGHT, &pixels).expect("view");
    let truth = truth();
    let decoder = GroundTruthDecoder(truth.clone());
    let blobs = TubeBlobs::from_truth(&truth);

    let outcome = scan_rack(&image, DPI, &decoder, Some(&blobs), &ScanConfig::default())
        .expect("scan");

    assert_eq!(outcome.regions.len(), 97);
    assert_eq!(outcome.regions[0].x, truth[0].top_left().x - 3);
    // Region order is preserved and the repeated first row is dropped.
    assert_eq!(outcome.detections, truth);

    let grid = &outcome.resolution.grid;
    assert_eq!(grid.filled(), 96);
    assert_eq!(grid.get(0, 0), Some("A1"));
    assert_eq!(grid.get(7, 11), Some("H12"));
    assert_eq!(grid.get(3, 5), Some("D6"));
}

#[test]
fn dyn_decoder_is_accepted() {
    let pixels = vec![0u8; (WIDTH * HEIGHT) as usize];
    let image = gray_view_from_slice(WIDTH, HEIGHT, &pixels).expect("view");
    let decoder: Box<dyn SymbolDecoder + Sync> = Box::new(GroundTruthDecoder(truth()));

    let outcome =
        scan_rack(&image, DPI, decoder.as_ref(), None, &ScanConfig::default()).expect("scan");
    assert_eq!(outcome.regions.len(), 1);
    assert_eq!(outcome.resolution.grid.filled(), 96);
}

#[test]
fn segmenter_finding_nothing_is_an_invalid_image() {
    struct Blank;
    impl Segmenter for Blank {
        fn segment(&self, _image: &GrayImageView<'_>, _preset: &BlobPreset) -> Vec<Region> {
            Vec::new()
        }
    }

    let pixels = vec![0u8; (WIDTH * HEIGHT) as usize];
    let image = gray_view_from_slice(WIDTH, HEIGHT, &pixels).expect("view");
    let err = scan_rack(
        &image,
        DPI,
        &GroundTruthDecoder(truth()),
        Some(&Blank),
        &ScanConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ScanError::Resolve(tubescan::ResolveError::ImageInvalid)
    ));
}
