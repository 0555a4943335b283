// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paper detector: runs classify -> grid -> rect -> geometry on one image.
//
// Detection is best-effort. Only a failure to decode the input is an error;
// everything else ends in `DetectionResult::not_detected()` so the user can
// always fall back to a manual crop of the full image.

use snapcrop_core::error::Result;
use snapcrop_core::{DetectionConfig, DetectionResult};
use tracing::{debug, info, instrument, warn};

use super::ScanError;
use super::classify::PaperMask;
use super::geometry::{confidence, grid_to_pixels, pad_rect, to_crop_area};
use super::grid::DensityGrid;
use super::rect::{GridRect, find_largest_rectangle};
use crate::image::loader::PixelBuffer;

/// Why a detection ended without a suggestion.
#[derive(Debug, Clone, PartialEq)]
pub enum Inconclusive {
    /// Too little of the photo is paper-coloured.
    CoverageTooLow { coverage: f64 },
    /// Nearly the whole photo is paper-coloured (e.g. a white wall).
    CoverageTooHigh { coverage: f64 },
    /// No grid cell reached the density threshold.
    NoPaperCells,
    /// The best rectangle is narrower or shorter than the minimum.
    RegionTooSmall { columns: u32, rows: u32 },
    /// The scan itself failed.
    ScanFailed(String),
}

impl std::fmt::Display for Inconclusive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoverageTooLow { coverage } => {
                write!(f, "paper coverage {:.1}% is too low", coverage * 100.0)
            }
            Self::CoverageTooHigh { coverage } => {
                write!(f, "paper coverage {:.1}% is too high", coverage * 100.0)
            }
            Self::NoPaperCells => write!(f, "no grid cell looks like paper"),
            Self::RegionTooSmall { columns, rows } => {
                write!(f, "largest paper region is only {columns}x{rows} cells")
            }
            Self::ScanFailed(detail) => write!(f, "scan failed: {detail}"),
        }
    }
}

/// Everything a detection run found out, for diagnostics.
#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub result: DetectionResult,
    /// Fraction of paper-like pixels in the whole image.
    pub coverage: f64,
    /// Grid size in cells (0 when the run stopped before the grid).
    pub grid_columns: u32,
    pub grid_rows: u32,
    /// Largest paper rectangle, if the scan got that far.
    pub rect: Option<GridRect>,
    /// Set exactly when `result.detected` is false.
    pub inconclusive: Option<Inconclusive>,
}

impl DetectionReport {
    fn inconclusive(reason: Inconclusive, coverage: f64) -> Self {
        Self {
            result: DetectionResult::not_detected(),
            coverage,
            grid_columns: 0,
            grid_rows: 0,
            rect: None,
            inconclusive: Some(reason),
        }
    }
}

/// Grid-density paper detector.
///
/// Holds only its configuration; every call builds its own mask and grid, so
/// one detector can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct PaperDetector {
    config: DetectionConfig,
}

impl PaperDetector {
    /// Create a detector after validating `config`.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect the paper region of an already-decoded image.
    pub fn detect(&self, buffer: &PixelBuffer) -> DetectionResult {
        self.analyze(buffer).result
    }

    /// Decode a data URI and detect. Only decoding errors are returned.
    pub fn detect_data_uri(&self, uri: &str) -> Result<DetectionResult> {
        let buffer = PixelBuffer::from_data_uri(uri)?;
        Ok(self.detect(&buffer))
    }

    /// Run the full pipeline and report how it went.
    #[instrument(skip_all, fields(width = buffer.width(), height = buffer.height()))]
    pub fn analyze(&self, buffer: &PixelBuffer) -> DetectionReport {
        let report = match self.scan(buffer) {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "Paper scan failed; falling back to full image");
                DetectionReport::inconclusive(Inconclusive::ScanFailed(err.to_string()), 0.0)
            }
        };

        match &report.inconclusive {
            Some(reason) => info!(%reason, "Paper not detected"),
            None => info!(
                x = report.result.crop_area.x,
                y = report.result.crop_area.y,
                width = report.result.crop_area.width,
                height = report.result.crop_area.height,
                confidence = report.result.confidence,
                "Paper detected"
            ),
        }
        report
    }

    fn scan(&self, buffer: &PixelBuffer) -> std::result::Result<DetectionReport, ScanError> {
        let config = &self.config;
        let dims = buffer.dimensions();

        // Step 1: paper mask and overall coverage.
        let mask = PaperMask::classify(buffer, config);
        let coverage = mask.coverage();
        debug!(coverage, "Paper coverage computed");

        if coverage < config.min_paper_coverage {
            return Ok(DetectionReport::inconclusive(
                Inconclusive::CoverageTooLow { coverage },
                coverage,
            ));
        }
        if coverage > config.max_paper_coverage {
            return Ok(DetectionReport::inconclusive(
                Inconclusive::CoverageTooHigh { coverage },
                coverage,
            ));
        }

        // Step 2: density grid. The mask is not needed past this point.
        let grid = DensityGrid::build(&mask, config.cell_size, config.min_cell_density)?;
        drop(mask);

        let mut report = DetectionReport {
            result: DetectionResult::not_detected(),
            coverage,
            grid_columns: grid.columns(),
            grid_rows: grid.rows(),
            rect: None,
            inconclusive: None,
        };

        // Step 3: largest rectangle of paper cells.
        let Some(rect) = find_largest_rectangle(&grid) else {
            report.inconclusive = Some(Inconclusive::NoPaperCells);
            return Ok(report);
        };
        report.rect = Some(rect);
        debug!(
            column = rect.column,
            row = rect.row,
            width = rect.width,
            height = rect.height,
            "Largest paper rectangle"
        );

        if !rect.spans_at_least(config.min_rect_cells) {
            report.inconclusive = Some(Inconclusive::RegionTooSmall {
                columns: rect.width,
                rows: rect.height,
            });
            return Ok(report);
        }

        // Step 4: pixels, padding, percentages, confidence.
        let pixels = grid_to_pixels(&rect, grid.cell_size(), dims);
        let padded = pad_rect(&pixels, dims, config.padding_percent);
        let crop_area = to_crop_area(&padded, dims);
        let mean_density = grid.mean_density(&rect)?;

        report.result = DetectionResult::found(
            crop_area,
            confidence(mean_density, config.confidence_multiplier),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    /// Black `width x height` photo with a white sheet at (x, y) of size (w, h).
    fn sheet_photo(width: u32, height: u32, sheet: (i32, i32, u32, u32)) -> PixelBuffer {
        let mut img = RgbImage::from_pixel(width, height, BLACK);
        let (x, y, w, h) = sheet;
        draw_filled_rect_mut(&mut img, Rect::at(x, y).of_size(w, h), WHITE);
        PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(img)).unwrap()
    }

    fn assert_near(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} +/- {tolerance}, got {actual}"
        );
    }

    #[test]
    fn centered_sheet_is_detected() {
        // Sheet spans 2/3 of each side, aligned to the 40 px cells.
        let buffer = sheet_photo(1200, 1200, (200, 200, 800, 800));
        let result = PaperDetector::default().detect(&buffer);

        assert!(result.detected);
        assert_near(result.crop_area.x, 16.7, 3.0);
        assert_near(result.crop_area.y, 16.7, 3.0);
        assert_near(result.crop_area.width, 66.7, 3.0);
        assert_near(result.crop_area.height, 66.7, 3.0);
        assert!(result.confidence > 0.7);
    }

    #[test]
    fn centered_sheet_with_finer_cells() {
        // 600x600 with the sheet at (100,100)-(500,500); 20 px cells line up
        // with the sheet edges.
        let buffer = sheet_photo(600, 600, (100, 100, 400, 400));
        let detector = PaperDetector::new(DetectionConfig {
            cell_size: 20,
            ..DetectionConfig::default()
        })
        .unwrap();
        let result = detector.detect(&buffer);

        assert!(result.detected);
        assert_near(result.crop_area.x, 16.7, 3.0);
        assert_near(result.crop_area.width, 66.7, 3.0);
        assert!(result.confidence > 0.7);
    }

    #[test]
    fn unaligned_sheet_still_covers_the_paper() {
        let buffer = sheet_photo(600, 600, (100, 100, 400, 400));
        let result = PaperDetector::default().detect(&buffer);

        assert!(result.detected);
        assert!(result.confidence > 0.7);
        // The suggested crop contains the whole sheet horizontally.
        assert!(result.crop_area.x <= 100.0 / 6.0);
        assert!(result.crop_area.x + result.crop_area.width >= 500.0 / 6.0);
    }

    #[test]
    fn all_white_photo_is_rejected_as_too_much_paper() {
        let buffer = sheet_photo(400, 400, (0, 0, 400, 400));
        let report = PaperDetector::default().analyze(&buffer);

        assert!(!report.result.detected);
        assert!(matches!(
            report.inconclusive,
            Some(Inconclusive::CoverageTooHigh { .. })
        ));
        assert_eq!(report.result, DetectionResult::not_detected());
    }

    #[test]
    fn nearly_white_photo_is_rejected() {
        // A thin dark strip: 97.5% of the pixels are paper.
        let buffer = sheet_photo(400, 400, (0, 0, 400, 390));
        assert!(!PaperDetector::default().detect(&buffer).detected);
    }

    #[test]
    fn dark_photo_is_rejected_as_too_little_paper() {
        let img = RgbImage::from_pixel(300, 200, Rgb([110, 110, 110]));
        let buffer = PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(img)).unwrap();
        let report = PaperDetector::default().analyze(&buffer);

        assert!(!report.result.detected);
        assert_eq!(report.coverage, 0.0);
        assert!(matches!(
            report.inconclusive,
            Some(Inconclusive::CoverageTooLow { .. })
        ));
    }

    #[test]
    fn six_by_six_cells_is_accepted() {
        let buffer = sheet_photo(400, 400, (40, 40, 240, 240));
        let report = PaperDetector::default().analyze(&buffer);
        assert!(report.result.detected, "{:?}", report.inconclusive);
        let rect = report.rect.unwrap();
        assert_eq!((rect.width, rect.height), (6, 6));
    }

    #[test]
    fn five_by_six_cells_is_rejected() {
        let buffer = sheet_photo(400, 400, (40, 40, 200, 240));
        let report = PaperDetector::default().analyze(&buffer);
        assert!(!report.result.detected);
        assert_eq!(
            report.inconclusive,
            Some(Inconclusive::RegionTooSmall { columns: 5, rows: 6 })
        );
    }

    #[test]
    fn six_by_five_cells_is_rejected() {
        let buffer = sheet_photo(400, 400, (40, 40, 240, 200));
        let report = PaperDetector::default().analyze(&buffer);
        assert!(!report.result.detected);
        assert_eq!(report.result.crop_area.width, 100.0);
    }

    #[test]
    fn sheet_touching_corner_stays_in_bounds() {
        let buffer = sheet_photo(400, 400, (160, 160, 240, 240));
        let result = PaperDetector::default().detect(&buffer);

        assert!(result.detected);
        let area = result.crop_area;
        assert!(area.validate().is_ok());
        assert!(area.x + area.width <= 100.0 + 1e-9);
        assert!(area.y + area.height <= 100.0 + 1e-9);
    }

    #[test]
    fn sheet_touching_origin_stays_in_bounds() {
        let buffer = sheet_photo(400, 400, (0, 0, 240, 240));
        let result = PaperDetector::default().detect(&buffer);

        assert!(result.detected);
        assert_eq!((result.crop_area.x, result.crop_area.y), (0.0, 0.0));
        assert!(result.crop_area.validate().is_ok());
    }

    #[test]
    fn ink_on_the_sheet_does_not_break_detection() {
        let mut img = RgbImage::from_pixel(800, 800, BLACK);
        draw_filled_rect_mut(&mut img, Rect::at(160, 160).of_size(480, 480), WHITE);
        // Hand-drawn strokes: dark lines every 30 px across the sheet.
        for offset in (180..620).step_by(30) {
            draw_filled_rect_mut(&mut img, Rect::at(170, offset).of_size(460, 4), BLACK);
        }
        let buffer = PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(img)).unwrap();
        let result = PaperDetector::default().detect(&buffer);

        assert!(result.detected);
        assert_near(result.crop_area.x, 20.0, 3.0);
        assert_near(result.crop_area.width, 60.0, 3.0);
    }

    #[test]
    fn detection_is_idempotent() {
        let buffer = sheet_photo(640, 480, (80, 40, 400, 360));
        let detector = PaperDetector::default();
        assert_eq!(detector.detect(&buffer), detector.detect(&buffer));
    }

    #[test]
    fn undecodable_data_uri_is_a_load_error() {
        let err = PaperDetector::default()
            .detect_data_uri("data:image/png;base64,AAAA")
            .unwrap_err();
        assert!(matches!(err, snapcrop_core::SnapcropError::Load(_)));
    }

    #[test]
    fn scan_failure_falls_back_to_not_detected() {
        // Bypasses `new`, which would reject the zero cell size.
        let detector = PaperDetector {
            config: DetectionConfig {
                cell_size: 0,
                ..DetectionConfig::default()
            },
        };
        let buffer = sheet_photo(400, 400, (40, 40, 240, 240));
        let report = detector.analyze(&buffer);

        assert_eq!(report.result, DetectionResult::not_detected());
        assert!(matches!(report.inconclusive, Some(Inconclusive::ScanFailed(_))));
        assert_eq!(report.rect, None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DetectionConfig {
            cell_size: 0,
            ..DetectionConfig::default()
        };
        assert!(PaperDetector::new(config).is_err());
    }
}
