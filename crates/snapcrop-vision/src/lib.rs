// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// snapcrop-vision: Image handling for the Snapcrop crop workflow.
//
// Provides image loading (data URIs, encoded bytes, files), grid-density
// paper detection that needs no computer-vision library, cropped-image
// production in percentage space, and a debug overlay of the suggested crop.

pub mod detect;
pub mod image;

// Re-export the primary structs so callers can use `snapcrop_vision::PaperDetector` etc.
pub use crate::detect::detector::{DetectionReport, Inconclusive, PaperDetector};
pub use crate::image::loader::PixelBuffer;
pub use crate::image::processor::{CroppedFile, CroppedImage, ImageProcessor, create_cropped_image};
