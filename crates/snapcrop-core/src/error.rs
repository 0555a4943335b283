// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Snapcrop.
//
// Only hard failures live here. An inconclusive paper detection is not an
// error: it is a `DetectionResult` with `detected == false`.

use thiserror::Error;

/// Top-level error type for all Snapcrop operations.
#[derive(Debug, Error)]
pub enum SnapcropError {
    // -- Image I/O --
    #[error("image could not be loaded: {0}")]
    Load(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Crop geometry --
    #[error("image dimensions are not known yet")]
    DimensionsUnknown,

    #[error("invalid crop area: {0}")]
    InvalidCropArea(String),

    // -- Crop workflow --
    #[error("invalid crop workflow transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("detection task failed: {0}")]
    Task(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SnapcropError>;
