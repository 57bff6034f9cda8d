//! JSON configuration, input and report helpers for rack scans.

use crate::decode::{BlobPreset, DecodeSettings, TubeType};
use crate::scan::ScanError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tubescan_core::{Detection, ImageInfo};
use tubescan_grid::{Bin, RackGrid, Resolution, ResolverParams};

/// Plate numbers accepted by [`ScanConfig::validate`].
pub const PLATE_NUMBERS: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(thiserror::Error, Debug)]
pub enum ScanIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_plate() -> u8 {
    1
}

/// Decoder tuning overrides; unset fields keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeOverrides {
    #[serde(default)]
    pub scan_gap_in: Option<f64>,
    #[serde(default)]
    pub square_dev_deg: Option<u32>,
    #[serde(default)]
    pub edge_thresh: Option<u32>,
    #[serde(default)]
    pub corrections: Option<u32>,
}

/// Configuration for one rack scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_plate")]
    pub plate: u8,
    #[serde(default)]
    pub tube_type: TubeType,
    #[serde(default)]
    pub resolver: ResolverParams,
    #[serde(default)]
    pub decode: DecodeOverrides,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            plate: default_plate(),
            tube_type: TubeType::default(),
            resolver: ResolverParams::default(),
            decode: DecodeOverrides::default(),
            output_path: None,
        }
    }
}

impl ScanConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tubescan_report.json"))
    }

    /// Check the plate number.
    pub fn validate(&self) -> Result<(), ScanError> {
        if !PLATE_NUMBERS.contains(&self.plate) {
            return Err(ScanError::InvalidPlateNumber(self.plate));
        }
        Ok(())
    }

    /// Decoder settings for a scan at `dpi`, applying overrides from the config.
    pub fn decode_settings(&self, dpi: u32) -> DecodeSettings {
        let defaults = DecodeSettings::for_dpi(dpi);
        DecodeSettings::with_tuning(
            dpi,
            self.decode.scan_gap_in.unwrap_or(defaults.scan_gap_in),
            self.decode.square_dev_deg.unwrap_or(defaults.square_dev_deg),
            self.decode.edge_thresh.unwrap_or(defaults.edge_thresh),
            self.decode.corrections.unwrap_or(defaults.corrections),
        )
    }

    /// Segmentation preset for a scan at `dpi`.
    pub fn blob_preset(&self, dpi: u32) -> BlobPreset {
        BlobPreset::for_dpi(dpi, self.tube_type)
    }
}

/// Already-decoded symbols of one scan, as consumed by `tubescan resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionsFile {
    pub image: ImageInfo,
    pub detections: Vec<Detection>,
}

impl DetectionsFile {
    /// Load a detections file from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this detections file to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub plate: u8,
    pub image: ImageInfo,
    pub num_detections: usize,
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub row_bins: Option<Vec<Bin>>,
    #[serde(default)]
    pub col_bins: Option<Vec<Bin>>,
    #[serde(default)]
    pub grid: Option<RackGrid>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ScanReport {
    /// Build a base report from the scan inputs.
    pub fn new(plate: u8, image: ImageInfo, detections: Vec<Detection>) -> Self {
        Self {
            plate,
            image,
            num_detections: detections.len(),
            detections,
            row_bins: None,
            col_bins: None,
            grid: None,
            error: None,
        }
    }

    /// Populate report fields from a successful resolution.
    pub fn set_resolution(&mut self, res: Resolution) {
        self.row_bins = Some(res.row_bins);
        self.col_bins = Some(res.col_bins);
        self.grid = Some(res.grid);
        self.error = None;
    }

    /// Record a scan error.
    pub fn set_error(&mut self, err: &ScanError) {
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
