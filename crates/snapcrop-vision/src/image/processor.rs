// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: percentage-space cropping and JPEG output for the
// confirmed crop.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::DynamicImage;
use snapcrop_core::error::{Result, SnapcropError};
use snapcrop_core::{CropArea, ImageDimensions, PixelRegion};
use tracing::{debug, info, instrument};

/// MIME type of every cropped image Snapcrop produces.
pub const CROPPED_MIME_TYPE: &str = "image/jpeg";

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`,
/// enabling method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_dynamic(image)
///     .crop_area(&CropArea::new(25.0, 25.0, 50.0, 50.0))?
///     .to_jpeg_bytes(90)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Crop a whole-pixel region. The region is clamped to image bounds.
    #[instrument(skip(self))]
    pub fn crop(self, region: PixelRegion) -> Self {
        let img_w = self.image.width();
        let img_h = self.image.height();

        let safe_x = region.x.min(img_w.saturating_sub(1));
        let safe_y = region.y.min(img_h.saturating_sub(1));
        let safe_w = region.width.min(img_w - safe_x);
        let safe_h = region.height.min(img_h - safe_y);

        debug!(safe_x, safe_y, safe_w, safe_h, "Cropping image");

        Self {
            image: self.image.crop_imm(safe_x, safe_y, safe_w, safe_h),
        }
    }

    /// Crop the region described by a percentage-space `CropArea`.
    ///
    /// Percentages map to pixels with nearest-pixel rounding, so a
    /// 25/25/50/50 area of a 400x400 image is exactly the 200x200 block
    /// starting at (100, 100).
    pub fn crop_area(self, area: &CropArea) -> Result<Self> {
        area.validate()?;
        let dims = self.dimensions();
        let region = area.to_pixels(dims).round_within(dims);
        info!(
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            "Cropping to percentage area"
        );
        Ok(self.crop(region))
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| SnapcropError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// A file-like handle for uploading the cropped image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedFile {
    /// `cropped-<unix millis>.jpg`
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The cropped image as a data URL plus the matching upload file.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub data_url: String,
    pub file: CroppedFile,
    pub dimensions: ImageDimensions,
}

/// Produce the final JPEG for a confirmed crop of `source`.
#[instrument(skip(source), fields(src_w = source.width(), src_h = source.height()))]
pub fn create_cropped_image(
    source: &DynamicImage,
    area: &CropArea,
    quality: u8,
) -> Result<CroppedImage> {
    let processor = ImageProcessor::from_dynamic(source.clone()).crop_area(area)?;
    let dimensions = processor.dimensions();
    let bytes = processor.to_jpeg_bytes(quality)?;

    let data_url = format!("data:{};base64,{}", CROPPED_MIME_TYPE, BASE64.encode(&bytes));
    let name = format!("cropped-{}.jpg", chrono::Utc::now().timestamp_millis());

    debug!(jpeg_bytes = bytes.len(), %name, "Cropped image encoded");
    Ok(CroppedImage {
        data_url,
        file: CroppedFile {
            name,
            mime_type: CROPPED_MIME_TYPE,
            bytes,
        },
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    /// 400x400 image whose pixel at (x, y) encodes its own coordinates.
    fn coordinate_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(400, 400, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 0])
        }))
    }

    #[test]
    fn quarter_margins_crop_exact_center_block() {
        let cropped = ImageProcessor::from_dynamic(coordinate_image())
            .crop_area(&CropArea::new(25.0, 25.0, 50.0, 50.0))
            .unwrap();

        assert_eq!(cropped.dimensions(), ImageDimensions::new(200, 200));
        // The first output pixel comes from source pixel (100, 100).
        let first = cropped.as_dynamic().get_pixel(0, 0);
        assert_eq!((first[0], first[1]), (100, 100));
        let last = cropped.as_dynamic().get_pixel(199, 199);
        assert_eq!((last[0], last[1]), (43, 43)); // 299 % 256
    }

    #[test]
    fn crop_area_rejects_invalid_area() {
        let result = ImageProcessor::from_dynamic(coordinate_image())
            .crop_area(&CropArea::new(80.0, 0.0, 50.0, 50.0));
        assert!(matches!(result, Err(SnapcropError::InvalidCropArea(_))));
    }

    #[test]
    fn cropped_image_has_jpeg_data_url_and_file() {
        let cropped =
            create_cropped_image(&coordinate_image(), &CropArea::new(25.0, 25.0, 50.0, 50.0), 90)
                .unwrap();

        assert_eq!(cropped.dimensions, ImageDimensions::new(200, 200));
        assert!(cropped.data_url.starts_with("data:image/jpeg;base64,"));
        assert!(cropped.file.name.starts_with("cropped-"));
        assert!(cropped.file.name.ends_with(".jpg"));
        assert_eq!(cropped.file.mime_type, "image/jpeg");

        let decoded = image::load_from_memory(&cropped.file.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (200, 200));
    }

    #[test]
    fn pixel_crop_clamps_to_bounds() {
        let cropped = ImageProcessor::from_dynamic(coordinate_image()).crop(PixelRegion {
            x: 350,
            y: 390,
            width: 100,
            height: 100,
        });
        assert_eq!(cropped.dimensions(), ImageDimensions::new(50, 10));
    }
}
