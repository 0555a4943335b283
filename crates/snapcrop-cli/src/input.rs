// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line inputs: image files, data-URI text files and crop areas.

use std::path::Path;

use image::DynamicImage;
use snapcrop_core::CropArea;
use snapcrop_core::error::Result;
use snapcrop_vision::image::loader::{decode_bytes, decode_data_uri};

/// An image as read from disk, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Encoded image file (PNG, JPEG, ...).
    Bytes(Vec<u8>),
    /// Text file holding a `data:` URI.
    DataUri(String),
}

impl ImageInput {
    /// Read `path`; files starting with `data:` are taken as data URIs.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        if bytes.starts_with(b"data:") {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            Ok(Self::DataUri(text))
        } else {
            Ok(Self::Bytes(bytes))
        }
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        match self {
            Self::Bytes(bytes) => decode_bytes(bytes),
            Self::DataUri(uri) => decode_data_uri(uri),
        }
    }
}

/// Parse `X,Y,W,H` percentages into a validated crop area.
pub fn parse_area(s: &str) -> std::result::Result<CropArea, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("expected X,Y,W,H percentages: {e}"))?;

    let &[x, y, width, height] = parts.as_slice() else {
        return Err(format!("expected 4 values (X,Y,W,H), got {}", parts.len()));
    };
    let area = CropArea::new(x, y, width, height);
    area.validate().map_err(|e| e.to_string())?;
    Ok(area)
}
