// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cropper widget model.
//
// `CropperWidget` is the seam to whatever UI shows the crop box.
// `ViewportCropper` is a headless implementation with free aspect ratio,
// used by the CLI and the tests.

use serde::{Deserialize, Serialize};
use snapcrop_core::{CropperConfig, ImageDimensions, PixelArea, Point, Size, WidgetTransform};

use crate::adapter::WidgetPlacement;

/// What the widget reports when the user confirms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedCrop {
    /// Selected rectangle in whole image pixels, clipped to the image.
    pub pixels: PixelArea,
    pub transform: WidgetTransform,
}

/// A crop box over a pannable, zoomable image.
pub trait CropperWidget {
    /// Size of the image being cropped.
    fn dimensions(&self) -> ImageDimensions;

    fn transform(&self) -> WidgetTransform;

    /// Crop box size in display pixels.
    fn crop_size(&self) -> Size;

    /// Set pan and zoom; the widget may clamp the zoom.
    fn set_transform(&mut self, transform: WidgetTransform);

    fn set_crop_size(&mut self, size: Size);

    /// Back to the whole image: pan (0, 0), zoom 1, full-size crop box.
    fn reset(&mut self);

    fn confirm(&self) -> ConfirmedCrop;

    /// Show a placement computed by the `CropAdapter`.
    fn apply(&mut self, placement: &WidgetPlacement) {
        self.set_transform(placement.transform);
        self.set_crop_size(placement.crop_size);
    }
}

/// Headless cropper whose viewport is the size of the image.
#[derive(Debug, Clone)]
pub struct ViewportCropper {
    dims: ImageDimensions,
    transform: WidgetTransform,
    crop_size: Size,
    min_zoom: f64,
    max_zoom: f64,
}

impl ViewportCropper {
    pub fn new(dims: ImageDimensions, config: &CropperConfig) -> Self {
        Self {
            dims,
            transform: WidgetTransform::default(),
            crop_size: Size::new(dims.width as f64, dims.height as f64),
            min_zoom: config.widget_min_zoom,
            max_zoom: config.widget_max_zoom,
        }
    }

    /// Drag the image by a display-space offset.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let pan = self.transform.pan;
        self.transform.pan = Point::new(pan.x + dx, pan.y + dy);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.transform.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Image pixel under the viewport centre.
    pub fn focus(&self) -> Point {
        let WidgetTransform { pan, zoom } = self.transform;
        Point::new(
            self.dims.width as f64 / 2.0 - pan.x * zoom,
            self.dims.height as f64 / 2.0 - pan.y * zoom,
        )
    }
}

impl CropperWidget for ViewportCropper {
    fn dimensions(&self) -> ImageDimensions {
        self.dims
    }

    fn transform(&self) -> WidgetTransform {
        self.transform
    }

    fn crop_size(&self) -> Size {
        self.crop_size
    }

    fn set_transform(&mut self, transform: WidgetTransform) {
        self.transform.pan = transform.pan;
        self.set_zoom(transform.zoom);
    }

    fn set_crop_size(&mut self, size: Size) {
        // The crop box cannot leave the viewport.
        self.crop_size = Size::new(
            size.width.clamp(1.0, self.dims.width.max(1) as f64),
            size.height.clamp(1.0, self.dims.height.max(1) as f64),
        );
    }

    fn reset(&mut self) {
        self.transform = WidgetTransform::default();
        self.crop_size = Size::new(self.dims.width as f64, self.dims.height as f64);
    }

    fn confirm(&self) -> ConfirmedCrop {
        let focus = self.focus();
        let zoom = self.transform.zoom;
        let half_w = self.crop_size.width / zoom / 2.0;
        let half_h = self.crop_size.height / zoom / 2.0;
        let (w, h) = (self.dims.width as f64, self.dims.height as f64);

        let x0 = (focus.x - half_w).clamp(0.0, w).round();
        let y0 = (focus.y - half_h).clamp(0.0, h).round();
        let x1 = (focus.x + half_w).clamp(0.0, w).round();
        let y1 = (focus.y + half_h).clamp(0.0, h).round();

        ConfirmedCrop {
            pixels: PixelArea::new(x0, y0, x1 - x0, y1 - y0),
            transform: self.transform,
        }
    }
}
