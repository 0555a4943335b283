// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// White-pixel classifier: labels every pixel as paper-like or not.

use snapcrop_core::DetectionConfig;
use tracing::debug;

use crate::image::loader::PixelBuffer;

/// Rec. 601 luma (0-255).
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// HSV-style saturation (0-1); black counts as unsaturated.
#[inline]
pub fn saturation(r: u8, g: u8, b: u8) -> f64 {
    let max = r.max(g).max(b);
    if max == 0 {
        return 0.0;
    }
    let min = r.min(g).min(b);
    (max - min) as f64 / max as f64
}

/// Bright and nearly grey: what a sheet of paper looks like under room light.
#[inline]
pub fn is_paper_pixel(r: u8, g: u8, b: u8, config: &DetectionConfig) -> bool {
    luma(r, g, b) > config.brightness_threshold && saturation(r, g, b) < config.saturation_threshold
}

/// One flag per pixel, row-major, plus the number of set flags.
#[derive(Debug, Clone)]
pub struct PaperMask {
    width: u32,
    height: u32,
    flags: Vec<bool>,
    paper_count: u64,
}

impl PaperMask {
    /// Classify every pixel of `buffer`.
    pub fn classify(buffer: &PixelBuffer, config: &DetectionConfig) -> Self {
        let mut flags = Vec::with_capacity(buffer.width() as usize * buffer.height() as usize);
        let mut paper_count = 0u64;

        for px in buffer.pixels().chunks_exact(4) {
            let paper = is_paper_pixel(px[0], px[1], px[2], config);
            paper_count += paper as u64;
            flags.push(paper);
        }

        debug!(
            paper_count,
            total = flags.len(),
            "Paper mask built"
        );
        Self {
            width: buffer.width(),
            height: buffer.height(),
            flags,
            paper_count,
        }
    }

    /// Build a mask directly from flags (row-major, `width * height` entries).
    pub fn from_flags(width: u32, height: u32, flags: Vec<bool>) -> Self {
        let paper_count = flags.iter().filter(|&&f| f).count() as u64;
        Self {
            width,
            height,
            flags,
            paper_count,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn paper_count(&self) -> u64 {
        self.paper_count
    }

    /// Fraction of all pixels that are paper-like.
    pub fn coverage(&self) -> f64 {
        let total = self.width as u64 * self.height as u64;
        if total == 0 {
            return 0.0;
        }
        self.paper_count as f64 / total as f64
    }
}
