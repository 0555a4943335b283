// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometry converter: grid rectangle to padded percentage crop, and the
// confidence score.

use snapcrop_core::{CropArea, ImageDimensions, PixelArea};

use super::rect::GridRect;

/// Whole-pixel rectangle, `max_x`/`max_y` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }
}

/// Pixel bounds of a grid rectangle, clipped to the image.
pub fn grid_to_pixels(rect: &GridRect, cell_size: u32, dims: ImageDimensions) -> PixelRect {
    let min_x = (rect.column * cell_size).min(dims.width);
    let min_y = (rect.row * cell_size).min(dims.height);
    PixelRect {
        min_x,
        min_y,
        max_x: ((rect.column + rect.width) * cell_size).clamp(min_x, dims.width),
        max_y: ((rect.row + rect.height) * cell_size).clamp(min_y, dims.height),
    }
}

/// Grow `rect` by `padding_percent` of its own size on every side.
///
/// The top-left corner is clipped at 0 and the size is clipped so the
/// padded rectangle never reaches past the right or bottom edge.
pub fn pad_rect(rect: &PixelRect, dims: ImageDimensions, padding_percent: f64) -> PixelArea {
    let (w, h) = (dims.width as f64, dims.height as f64);
    let pad_x = rect.width() as f64 * padding_percent;
    let pad_y = rect.height() as f64 * padding_percent;

    let x = (rect.min_x as f64 - pad_x).max(0.0);
    let y = (rect.min_y as f64 - pad_y).max(0.0);
    PixelArea {
        x,
        y,
        width: (rect.width() as f64 + 2.0 * pad_x).min(w - x),
        height: (rect.height() as f64 + 2.0 * pad_y).min(h - y),
    }
}

/// Percentage crop of a pixel area, each component clamped to [0, 100].
pub fn to_crop_area(area: &PixelArea, dims: ImageDimensions) -> CropArea {
    let raw = CropArea::from_pixels(area, dims);
    CropArea {
        x: raw.x.clamp(0.0, 100.0),
        y: raw.y.clamp(0.0, 100.0),
        width: raw.width.clamp(0.0, 100.0 - raw.x.clamp(0.0, 100.0)),
        height: raw.height.clamp(0.0, 100.0 - raw.y.clamp(0.0, 100.0)),
    }
}

/// Linear boost of the mean cell density, saturating at 1.
///
/// Ink keeps even a clean sheet below density 1, hence the multiplier.
pub fn confidence(mean_density: f64, multiplier: f64) -> f64 {
    (mean_density * multiplier).clamp(0.0, 1.0)
}
