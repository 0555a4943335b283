// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection and cropper tunables.
//
// Every threshold of the paper detector is a field here rather than a
// constant so that tests (and callers) can run the pipeline with their own
// parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapcropError};

/// Parameters of the grid-density paper detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Luma a pixel must exceed to count as paper (0-255).
    pub brightness_threshold: f64,
    /// Saturation a pixel must stay below to count as paper (0-1).
    pub saturation_threshold: f64,
    /// Below this fraction of paper pixels the image is rejected.
    pub min_paper_coverage: f64,
    /// Above this fraction of paper pixels the image is rejected.
    pub max_paper_coverage: f64,
    /// Fraction of the detected rectangle added on every side.
    pub padding_percent: f64,
    /// Edge length of a density cell in pixels.
    pub cell_size: u32,
    /// Minimum paper density for a cell to count as paper.
    pub min_cell_density: f64,
    /// Minimum width and height of the winning rectangle, in cells.
    pub min_rect_cells: u32,
    /// Linear boost applied to the mean cell density to get the confidence.
    pub confidence_multiplier: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            brightness_threshold: 120.0,
            saturation_threshold: 0.3,
            min_paper_coverage: 0.05,
            max_paper_coverage: 0.95,
            padding_percent: 0.02,
            cell_size: 40,
            min_cell_density: 0.35,
            min_rect_cells: 6,
            confidence_multiplier: 1.2,
        }
    }
}

impl DetectionConfig {
    /// Reject parameter combinations the detector cannot work with.
    pub fn validate(&self) -> Result<()> {
        ensure(self.cell_size > 0, "cell_size must be at least 1")?;
        ensure(self.min_rect_cells > 0, "min_rect_cells must be at least 1")?;
        ensure(
            (0.0..=255.0).contains(&self.brightness_threshold),
            "brightness_threshold must be within 0..=255",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.saturation_threshold),
            "saturation_threshold must be within 0..=1",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.min_paper_coverage)
                && (0.0..=1.0).contains(&self.max_paper_coverage)
                && self.min_paper_coverage < self.max_paper_coverage,
            "paper coverage bounds must satisfy 0 <= min < max <= 1",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.min_cell_density),
            "min_cell_density must be within 0..=1",
        )?;
        ensure(
            (0.0..0.5).contains(&self.padding_percent),
            "padding_percent must be within 0..0.5",
        )?;
        ensure(
            self.confidence_multiplier > 0.0,
            "confidence_multiplier must be positive",
        )
    }
}

/// Parameters of the crop workflow and the cropper widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropperConfig {
    /// Lower clamp for the zoom derived from a detected region.
    pub min_zoom: f64,
    /// Upper clamp for the zoom derived from a detected region.
    pub max_zoom: f64,
    /// Lowest zoom the user may choose in the widget.
    pub widget_min_zoom: f64,
    /// Highest zoom the user may choose in the widget.
    pub widget_max_zoom: f64,
    /// A detection must beat this confidence to be pre-applied.
    pub min_confidence: f64,
    /// JPEG quality (1-100) of the produced cropped image.
    pub jpeg_quality: u8,
    /// Optional upper bound on a detection run, in milliseconds.
    pub detection_timeout_ms: Option<u64>,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 3.0,
            widget_min_zoom: 0.5,
            widget_max_zoom: 3.0,
            min_confidence: 0.1,
            jpeg_quality: 90,
            detection_timeout_ms: None,
        }
    }
}

impl CropperConfig {
    pub fn validate(&self) -> Result<()> {
        ensure(
            self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom,
            "zoom clamp must satisfy 0 < min_zoom <= max_zoom",
        )?;
        ensure(
            self.widget_min_zoom > 0.0 && self.widget_min_zoom <= self.widget_max_zoom,
            "widget zoom range must satisfy 0 < widget_min_zoom <= widget_max_zoom",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.min_confidence),
            "min_confidence must be within 0..=1",
        )?;
        ensure(
            (1..=100).contains(&self.jpeg_quality),
            "jpeg_quality must be within 1..=100",
        )
    }
}

/// Complete Snapcrop settings, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detection: DetectionConfig,
    pub cropper: CropperConfig,
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.detection.validate()?;
        self.cropper.validate()
    }
}

fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(SnapcropError::Config(message.to_string()))
    }
}
