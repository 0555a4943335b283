// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loader: turns a data URI, encoded bytes or a file into a flat RGBA
// pixel buffer for the paper detector.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::DynamicImage;
use snapcrop_core::ImageDimensions;
use snapcrop_core::error::{Result, SnapcropError};
use tracing::{debug, info, instrument};

/// Decoded pixels of one image, RGBA8, row-major, no padding.
///
/// A buffer is built once per detection call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    // -- Construction ---------------------------------------------------------

    /// Wrap raw RGBA8 pixels. `data` must hold exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SnapcropError::Load(format!(
                "image has zero dimensions ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(SnapcropError::Load(format!(
                "expected {expected} bytes of RGBA data, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copy the pixels out of an already-decoded image.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width, height, rgba.into_raw())
    }

    /// Decode raw encoded bytes (JPEG, PNG, WebP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = decode_bytes(data)?;
        Self::from_dynamic(&image)
    }

    /// Decode a `data:<mime>;base64,<payload>` URI.
    #[instrument(skip(uri), fields(uri_len = uri.len()))]
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let image = decode_data_uri(uri)?;
        Self::from_dynamic(&image)
    }

    /// Decode an image file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            SnapcropError::Load(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        Self::from_dynamic(&image)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.width, self.height)
    }

    /// The flat RGBA8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }
}

/// Decode encoded image bytes, rejecting zero-sized results.
pub fn decode_bytes(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| SnapcropError::Load(format!("failed to decode image: {}", err)))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(SnapcropError::Load("image has zero dimensions".into()));
    }
    info!(
        width = image.width(),
        height = image.height(),
        "Image decoded"
    );
    Ok(image)
}

/// Decode a base64 data URI into an image.
pub fn decode_data_uri(uri: &str) -> Result<DynamicImage> {
    let payload = data_uri_payload(uri)?;
    debug!(payload_len = payload.len(), "Data URI payload extracted");
    decode_bytes(&payload)
}

/// Extract and base64-decode the payload of a data URI.
///
/// Only base64 payloads are accepted; image data URIs produced by canvases
/// and cameras are always base64.
pub fn data_uri_payload(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| SnapcropError::Load("not a data URI (missing `data:` prefix)".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SnapcropError::Load("data URI has no payload separator".into()))?;

    let is_base64 = header
        .split(';')
        .skip(1)
        .any(|param| param.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(SnapcropError::Load(format!(
            "only base64 data URIs are supported (header `{header}`)"
        )));
    }

    // Line-wrapped base64 is common in copied URIs.
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|err| SnapcropError::Load(format!("invalid base64 payload: {}", err)))
}
