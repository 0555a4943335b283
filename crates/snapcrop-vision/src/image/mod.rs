// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: decoding, percentage-space cropping, JPEG output and overlays.

pub mod loader;
pub mod overlay;
pub mod processor;

pub use loader::PixelBuffer;
pub use processor::ImageProcessor;
