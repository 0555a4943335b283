// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Results go to stdout as JSON, logs to stderr.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use snapcrop_core::error::{Result, SnapcropError};
use snapcrop_core::human_errors::{DETECTING_MESSAGE, detection_message};
use snapcrop_core::{AppConfig, CropArea};
use snapcrop_cropper::{CropController, CropperWidget, ViewportCropper};
use snapcrop_vision::image::overlay::{OUTLINE_COLOR, render_overlay};
use snapcrop_vision::{CroppedImage, PaperDetector, PixelBuffer, create_cropped_image};
use tracing::info;

use crate::input::ImageInput;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `snapcrop detect`: run the detector once and print the result.
pub fn detect(
    config: &AppConfig,
    input: &Path,
    report: bool,
    overlay: Option<&Path>,
) -> Result<()> {
    let output = detect_json(config, input, report, overlay)?;
    print_json(&output)
}

fn detect_json(
    config: &AppConfig,
    input: &Path,
    report: bool,
    overlay: Option<&Path>,
) -> Result<serde_json::Value> {
    let image = ImageInput::read(input)?.decode()?;
    let detector = PaperDetector::new(config.detection.clone())?;
    let analysis = detector.analyze(&PixelBuffer::from_dynamic(&image)?);

    if let Some(path) = overlay {
        render_overlay(&image, &analysis.result.crop_area, OUTLINE_COLOR)
            .save(path)
            .map_err(|e| SnapcropError::Encode(format!("overlay {}: {e}", path.display())))?;
        info!(path = %path.display(), "Overlay written");
    }

    let mut output = serde_json::to_value(analysis.result)?;
    if report {
        output["report"] = json!({
            "message": detection_message(&analysis.result, config.cropper.min_confidence),
            "coverage": analysis.coverage,
            "gridColumns": analysis.grid_columns,
            "gridRows": analysis.grid_rows,
            "rect": analysis.rect.map(|r| json!({
                "column": r.column,
                "row": r.row,
                "width": r.width,
                "height": r.height,
            })),
            "reason": analysis.inconclusive.as_ref().map(ToString::to_string),
        });
    }
    Ok(output)
}

/// `snapcrop crop`: crop to an explicit area and write the JPEG.
pub fn crop(
    config: &AppConfig,
    input: &Path,
    area: &CropArea,
    out: Option<&Path>,
    quality: Option<u8>,
) -> Result<()> {
    let mut cropper = config.cropper.clone();
    if let Some(quality) = quality {
        cropper.jpeg_quality = quality;
    }
    cropper.validate()?;

    let image = ImageInput::read(input)?.decode()?;
    let cropped = create_cropped_image(&image, area, cropper.jpeg_quality)?;
    let path = write_cropped(&cropped, out)?;
    print_json(&written_json(&cropped, &path))
}

/// `snapcrop auto`: detect, accept the suggestion as the widget shows it,
/// confirm and write the JPEG.
pub async fn auto(config: &AppConfig, input: &Path, out: Option<&Path>) -> Result<()> {
    let controller = CropController::new(config)?;
    info!(input = %input.display(), "{DETECTING_MESSAGE}");
    let outcome = match ImageInput::read(input)? {
        ImageInput::Bytes(bytes) => controller.open_bytes(bytes).await?,
        ImageInput::DataUri(uri) => controller.open_data_uri(uri).await?,
    }
    .ok_or_else(|| SnapcropError::Task("crop session was cancelled".into()))?;
    info!(stage = %outcome.stage, "{}", outcome.message);

    let dims = controller
        .workflow()?
        .dimensions()
        .ok_or(SnapcropError::DimensionsUnknown)?;
    let mut widget = ViewportCropper::new(dims, &config.cropper);
    widget.apply(&outcome.placement);

    let cropped = controller.confirm(&widget.confirm()).await?;
    let path = write_cropped(&cropped, out)?;

    let mut output = written_json(&cropped, &path);
    output["stage"] = json!(outcome.stage);
    output["message"] = json!(outcome.message);
    output["detection"] = json!(outcome.result);
    output["placement"] = json!(outcome.placement);
    print_json(&output)
}

fn write_cropped(cropped: &CroppedImage, out: Option<&Path>) -> Result<PathBuf> {
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&cropped.file.name));
    std::fs::write(&path, &cropped.file.bytes)?;
    info!(path = %path.display(), bytes = cropped.file.bytes.len(), "Cropped image written");
    Ok(path)
}

fn written_json(cropped: &CroppedImage, path: &Path) -> serde_json::Value {
    json!({
        "output": path.display().to_string(),
        "mimeType": cropped.file.mime_type,
        "width": cropped.dimensions.width,
        "height": cropped.dimensions.height,
        "bytes": cropped.file.bytes.len(),
    })
}
