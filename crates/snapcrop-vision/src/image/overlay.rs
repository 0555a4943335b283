// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debug overlay: draws the suggested crop rectangle on top of the source
// photo so a detection can be checked by eye.

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use snapcrop_core::{CropArea, ImageDimensions};

/// Default outline colour (opaque magenta, rarely present on paper photos).
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Render `area` as a hollow rectangle over a copy of `image`.
///
/// The outline is drawn inwards from the crop edge and its thickness scales
/// with the image (at least 2 px).
pub fn render_overlay(image: &DynamicImage, area: &CropArea, color: Rgba<u8>) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let dims = ImageDimensions::new(canvas.width(), canvas.height());
    if dims.is_empty() {
        return canvas;
    }

    let region = area.to_pixels(dims).round_within(dims);
    let thickness = (dims.width.min(dims.height) / 200).max(2);

    for inset in 0..thickness {
        let width = region.width.saturating_sub(2 * inset);
        let height = region.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32)
            .of_size(width, height);
        draw_hollow_rect_mut(&mut canvas, rect, color);
    }
    canvas
}
