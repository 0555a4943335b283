// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop coordinate adapter: percentage crop areas to cropper-widget pan/zoom
// and back.
//
// Widget model: the viewport is the size of the image, the crop box is
// centred in it, and the image point under the viewport centre is
// `dimension / 2 - pan * zoom`. A crop box of `s` display pixels covers
// `s / zoom` image pixels.

use serde::{Deserialize, Serialize};
use snapcrop_core::error::{Result, SnapcropError};
use snapcrop_core::{CropArea, CropperConfig, ImageDimensions, PixelArea, Point, Size, WidgetTransform};
use tracing::debug;

use crate::widget::ConfirmedCrop;

/// Everything the widget needs to show a crop area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetPlacement {
    pub transform: WidgetTransform,
    /// Crop box size in display pixels.
    pub crop_size: Size,
}

/// Converts between `CropArea` percentages and widget coordinates for one
/// image.
#[derive(Debug, Clone, Copy)]
pub struct CropAdapter {
    dims: ImageDimensions,
    min_zoom: f64,
    max_zoom: f64,
}

impl CropAdapter {
    /// Fails with `DimensionsUnknown` until the image has been loaded.
    pub fn new(dims: Option<ImageDimensions>, config: &CropperConfig) -> Result<Self> {
        let dims = dims
            .filter(|d| !d.is_empty())
            .ok_or(SnapcropError::DimensionsUnknown)?;
        Ok(Self {
            dims,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        })
    }

    pub fn dimensions(&self) -> ImageDimensions {
        self.dims
    }

    /// Zoom that makes the larger side of `area` fill the viewport.
    pub fn zoom_for(&self, area: &CropArea) -> f64 {
        let largest = (area.width / 100.0).max(area.height / 100.0);
        (1.0 / largest).clamp(self.min_zoom, self.max_zoom)
    }

    /// Pan, zoom and crop box size that centre `area` in the widget.
    pub fn to_widget(&self, area: &CropArea) -> Result<WidgetPlacement> {
        area.validate()?;
        let (w, h) = (self.dims.width as f64, self.dims.height as f64);
        let zoom = self.zoom_for(area);

        let pan = Point::new(
            (0.5 - area.center_x_fraction()) * w / zoom,
            (0.5 - area.center_y_fraction()) * h / zoom,
        );
        let crop_size = Size::new(
            area.width / 100.0 * w * zoom,
            area.height / 100.0 * h * zoom,
        );

        debug!(zoom, pan_x = pan.x, pan_y = pan.y, "Crop area placed in widget");
        Ok(WidgetPlacement {
            transform: WidgetTransform { pan, zoom },
            crop_size,
        })
    }

    /// Percentages of a pixel rectangle reported by the widget.
    pub fn from_widget_pixels(&self, pixels: &PixelArea) -> CropArea {
        CropArea::from_pixels(pixels, self.dims)
    }

    pub fn from_confirmed(&self, crop: &ConfirmedCrop) -> CropArea {
        self.from_widget_pixels(&crop.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::{CropperWidget, ViewportCropper};

    fn adapter(width: u32, height: u32) -> CropAdapter {
        CropAdapter::new(
            Some(ImageDimensions::new(width, height)),
            &CropperConfig::default(),
        )
        .unwrap()
    }

    /// Percentages -> widget -> confirmed pixels -> percentages.
    fn round_trip(width: u32, height: u32, area: CropArea) {
        let dims = ImageDimensions::new(width, height);
        let adapter = adapter(width, height);
        let placement = adapter.to_widget(&area).unwrap();

        let mut widget = ViewportCropper::new(dims, &CropperConfig::default());
        widget.apply(&placement);
        let back = adapter.from_confirmed(&widget.confirm());

        let expected = area.to_pixels(dims);
        let actual = back.to_pixels(dims);
        for (e, a) in [
            (expected.x, actual.x),
            (expected.y, actual.y),
            (expected.width, actual.width),
            (expected.height, actual.height),
        ] {
            assert!((e - a).abs() <= 1.0, "{width}x{height}: {expected:?} vs {actual:?}");
        }
    }

    #[test]
    fn round_trip_within_one_pixel() {
        let areas = [
            CropArea::new(12.3, 20.1, 55.5, 40.7),
            CropArea::new(0.0, 0.0, 100.0, 100.0),
            CropArea::new(70.0, 65.0, 30.0, 35.0),
            CropArea::new(40.0, 45.0, 10.0, 8.0),
        ];
        for (w, h) in [(1920, 1080), (800, 600), (4000, 3000)] {
            for area in areas {
                round_trip(w, h, area);
            }
        }
    }

    #[test]
    fn full_image_is_unzoomed_and_centered() {
        let placement = adapter(800, 600).to_widget(&CropArea::full()).unwrap();
        assert_eq!(placement.transform.zoom, 1.0);
        assert_eq!(placement.transform.pan, Point::new(0.0, 0.0));
        assert_eq!(placement.crop_size, Size::new(800.0, 600.0));
    }

    #[test]
    fn zoom_follows_the_larger_side() {
        let adapter = adapter(1000, 1000);
        // Largest side is half the image -> zoom 2.
        assert_eq!(adapter.zoom_for(&CropArea::new(10.0, 10.0, 50.0, 20.0)), 2.0);
        // Tiny regions stop at the max zoom.
        assert_eq!(adapter.zoom_for(&CropArea::new(10.0, 10.0, 5.0, 5.0)), 3.0);
    }

    #[test]
    fn pan_moves_region_center_to_viewport_center() {
        // Region centred at 25% / 50% of a 1000x800 image, 50% wide.
        let placement = adapter(1000, 800)
            .to_widget(&CropArea::new(0.0, 25.0, 50.0, 50.0))
            .unwrap();
        assert_eq!(placement.transform.zoom, 2.0);
        assert!((placement.transform.pan.x - 125.0).abs() < 1e-9);
        assert!(placement.transform.pan.y.abs() < 1e-9);
    }

    #[test]
    fn unknown_dimensions_are_rejected() {
        let config = CropperConfig::default();
        assert!(matches!(
            CropAdapter::new(None, &config),
            Err(SnapcropError::DimensionsUnknown)
        ));
        assert!(matches!(
            CropAdapter::new(Some(ImageDimensions::new(0, 10)), &config),
            Err(SnapcropError::DimensionsUnknown)
        ));
    }

    #[test]
    fn invalid_area_is_rejected() {
        let err = adapter(100, 100)
            .to_widget(&CropArea::new(80.0, 0.0, 40.0, 50.0))
            .unwrap_err();
        assert!(matches!(err, SnapcropError::InvalidCropArea(_)));
    }
}
