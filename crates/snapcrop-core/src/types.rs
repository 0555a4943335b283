// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Snapcrop: crop areas in percentage space, pixel
// rectangles, detection results and the cropper widget's pan/zoom state.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapcropError};

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle in percentages (0-100) of the original, uncropped image.
///
/// This is the unit of exchange between the detector, the cropper widget
/// and the cropped-image generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole image, used whenever detection is inconclusive.
    pub fn full() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }

    /// Horizontal centre as a fraction (0-1) of the image width.
    pub fn center_x_fraction(&self) -> f64 {
        (self.x + self.width / 2.0) / 100.0
    }

    /// Vertical centre as a fraction (0-1) of the image height.
    pub fn center_y_fraction(&self) -> f64 {
        (self.y + self.height / 2.0) / 100.0
    }

    /// Check that every component lies in [0, 100], the area is not empty
    /// and it does not extend past the right or bottom edge.
    pub fn validate(&self) -> Result<()> {
        let components = [self.x, self.y, self.width, self.height];
        if components
            .iter()
            .any(|v| !v.is_finite() || !(0.0..=100.0).contains(v))
        {
            return Err(SnapcropError::InvalidCropArea(format!(
                "components must lie within 0..=100, got {self:?}"
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SnapcropError::InvalidCropArea(format!(
                "width and height must be positive, got {self:?}"
            )));
        }
        // Allow for floating point noise from pixel -> percent conversion.
        if self.x + self.width > 100.0 + 1e-6 || self.y + self.height > 100.0 + 1e-6 {
            return Err(SnapcropError::InvalidCropArea(format!(
                "area extends past the image edge: {self:?}"
            )));
        }
        Ok(())
    }

    /// Exact (unrounded) pixel rectangle of this area in an image.
    pub fn to_pixels(&self, dims: ImageDimensions) -> PixelArea {
        let w = dims.width as f64;
        let h = dims.height as f64;
        PixelArea {
            x: self.x / 100.0 * w,
            y: self.y / 100.0 * h,
            width: self.width / 100.0 * w,
            height: self.height / 100.0 * h,
        }
    }

    /// Percentage area covering a pixel rectangle of an image.
    pub fn from_pixels(area: &PixelArea, dims: ImageDimensions) -> Self {
        let w = dims.width as f64;
        let h = dims.height as f64;
        Self {
            x: area.x / w * 100.0,
            y: area.y / h * 100.0,
            width: area.width / w * 100.0,
            height: area.height / h * 100.0,
        }
    }
}

impl Default for CropArea {
    fn default() -> Self {
        Self::full()
    }
}

/// A rectangle in (possibly fractional) image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Snap to whole pixels (nearest-pixel rounding) inside the image.
    ///
    /// The region is never empty: both sides are at least one pixel.
    pub fn round_within(&self, dims: ImageDimensions) -> PixelRegion {
        let max_x = dims.width.saturating_sub(1);
        let max_y = dims.height.saturating_sub(1);
        let x = (self.x.round().max(0.0) as u32).min(max_x);
        let y = (self.y.round().max(0.0) as u32).min(max_y);
        let width = (self.width.round().max(1.0) as u32).min(dims.width - x);
        let height = (self.height.round().max(1.0) as u32).min(dims.height - y);
        PixelRegion {
            x,
            y,
            width,
            height,
        }
    }
}

/// A rectangle in whole image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Outcome of one paper detection call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub detected: bool,
    pub crop_area: CropArea,
    /// Heuristic score in [0, 1]; not a probability.
    pub confidence: f64,
}

impl DetectionResult {
    /// Inconclusive result: full image, zero confidence.
    pub fn not_detected() -> Self {
        Self {
            detected: false,
            crop_area: CropArea::full(),
            confidence: 0.0,
        }
    }

    pub fn found(crop_area: CropArea, confidence: f64) -> Self {
        Self {
            detected: true,
            crop_area,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Whether the result is good enough to pre-apply as a crop suggestion.
    pub fn is_suggestion(&self, min_confidence: f64) -> bool {
        self.detected && self.confidence > min_confidence
    }
}

/// A 2-D point or offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2-D extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Pan/zoom state of the cropper widget.
///
/// `pan` is expressed in the widget's zoomed display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidgetTransform {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for WidgetTransform {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
        }
    }
}
