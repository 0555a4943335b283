// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paper detection: locates the sheet of paper in a photo without any
// computer-vision library:
//
//   classify: bright, low-saturation pixels become a paper mask
//   grid:     the mask is summarised as per-cell paper density
//   rect:     the largest rectangle of paper cells (histogram + stack)
//   geometry: cells -> pixels -> padded percentage crop + confidence
//   detector: the pipeline, with every failure downgraded to "not detected"

pub mod classify;
pub mod detector;
pub mod geometry;
pub mod grid;
pub mod rect;

pub use detector::{DetectionReport, Inconclusive, PaperDetector};

use thiserror::Error;

/// Internal failures while scanning a buffer.
///
/// These never leave the detector: `PaperDetector` turns them into a
/// `detected: false` result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("cell size must be at least one pixel")]
    InvalidCellSize,

    #[error("mask holds {actual} entries, expected {expected}")]
    MaskSizeMismatch { expected: usize, actual: usize },

    #[error("grid rectangle {rect:?} lies outside a {columns}x{rows} grid")]
    RectOutOfGrid {
        rect: rect::GridRect,
        columns: u32,
        rows: u32,
    },
}
