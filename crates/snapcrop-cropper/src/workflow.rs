// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop workflow state machine.
//
//   idle -> detecting -> suggested | manual -> adjusting -> confirmed
//   confirmed -> adjusting   (re-crop)
//   any -> idle              (cancel)
//
// Every detection request gets a `DetectionTicket` carrying the workflow
// generation. Cancelling bumps the generation, so a result that arrives for
// an older ticket is dropped without touching the state.

use serde::{Deserialize, Serialize};
use snapcrop_core::error::{Result, SnapcropError};
use snapcrop_core::{CropArea, DetectionResult, ImageDimensions};
use tracing::{debug, info};

/// Stages of the crop workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropStage {
    /// No image.
    Idle,
    /// Image loaded, detection running.
    Detecting,
    /// Detection succeeded and its crop is pre-applied.
    Suggested,
    /// Detection was inconclusive; the full image is shown.
    Manual,
    /// The user is moving the crop box.
    Adjusting,
    /// The user accepted a crop.
    Confirmed,
}

impl std::fmt::Display for CropStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Detecting => "detecting",
            Self::Suggested => "suggested",
            Self::Manual => "manual",
            Self::Adjusting => "adjusting",
            Self::Confirmed => "confirmed",
        };
        f.write_str(name)
    }
}

/// Handle for one in-flight detection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionTicket(u64);

impl DetectionTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct CropWorkflow {
    stage: CropStage,
    generation: u64,
    min_confidence: f64,
    dimensions: Option<ImageDimensions>,
    detection: Option<DetectionResult>,
    crop: CropArea,
    confirmed: Option<CropArea>,
}

impl CropWorkflow {
    /// `min_confidence` gates which detections are pre-applied.
    pub fn new(min_confidence: f64) -> Self {
        Self {
            stage: CropStage::Idle,
            generation: 0,
            min_confidence,
            dimensions: None,
            detection: None,
            crop: CropArea::full(),
            confirmed: None,
        }
    }

    pub fn stage(&self) -> CropStage {
        self.stage
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `None` until an image has been loaded.
    pub fn dimensions(&self) -> Option<ImageDimensions> {
        self.dimensions
    }

    pub fn detection(&self) -> Option<&DetectionResult> {
        self.detection.as_ref()
    }

    /// The crop currently shown in the widget.
    pub fn crop(&self) -> CropArea {
        self.crop
    }

    pub fn confirmed(&self) -> Option<CropArea> {
        self.confirmed
    }

    /// idle -> detecting, for an image of `dims`.
    pub fn begin_detection(&mut self, dims: ImageDimensions) -> Result<DetectionTicket> {
        self.expect_stage(&[CropStage::Idle], CropStage::Detecting)?;
        self.generation += 1;
        self.dimensions = Some(dims);
        self.stage = CropStage::Detecting;
        debug!(generation = self.generation, %dims, "Detection started");
        Ok(DetectionTicket(self.generation))
    }

    /// detecting -> suggested | manual.
    ///
    /// Returns `None` (and changes nothing) when the ticket is stale.
    pub fn complete_detection(
        &mut self,
        ticket: DetectionTicket,
        result: DetectionResult,
    ) -> Option<CropStage> {
        if ticket.0 != self.generation || self.stage != CropStage::Detecting {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding stale detection result"
            );
            return None;
        }

        let stage = if result.is_suggestion(self.min_confidence) {
            self.crop = result.crop_area;
            CropStage::Suggested
        } else {
            self.crop = CropArea::full();
            CropStage::Manual
        };
        self.detection = Some(result);
        self.stage = stage;
        info!(%stage, confidence = result.confidence, "Detection finished");
        Some(stage)
    }

    /// suggested | manual | adjusting -> adjusting, with the user's crop.
    pub fn adjust(&mut self, area: CropArea) -> Result<()> {
        self.expect_stage(
            &[CropStage::Suggested, CropStage::Manual, CropStage::Adjusting],
            CropStage::Adjusting,
        )?;
        area.validate()?;
        self.crop = area;
        self.stage = CropStage::Adjusting;
        Ok(())
    }

    /// adjusting -> confirmed.
    pub fn confirm(&mut self, area: CropArea) -> Result<()> {
        self.expect_stage(&[CropStage::Adjusting], CropStage::Confirmed)?;
        area.validate()?;
        self.crop = area;
        self.confirmed = Some(area);
        self.stage = CropStage::Confirmed;
        info!(
            x = area.x,
            y = area.y,
            width = area.width,
            height = area.height,
            "Crop confirmed"
        );
        Ok(())
    }

    /// confirmed -> adjusting, starting from the confirmed crop.
    pub fn recrop(&mut self) -> Result<()> {
        self.expect_stage(&[CropStage::Confirmed], CropStage::Adjusting)?;
        self.confirmed = None;
        self.stage = CropStage::Adjusting;
        Ok(())
    }

    /// any -> idle. Outstanding tickets become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.stage = CropStage::Idle;
        self.dimensions = None;
        self.detection = None;
        self.crop = CropArea::full();
        self.confirmed = None;
        debug!(generation = self.generation, "Crop workflow cancelled");
    }

    fn expect_stage(&self, allowed: &[CropStage], to: CropStage) -> Result<()> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(SnapcropError::InvalidTransition {
                from: self.stage.to_string(),
                to: to.to_string(),
            })
        }
    }
}

impl Default for CropWorkflow {
    fn default() -> Self {
        Self::new(snapcrop_core::CropperConfig::default().min_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> ImageDimensions {
        ImageDimensions::new(800, 600)
    }

    fn suggestion() -> DetectionResult {
        DetectionResult::found(CropArea::new(10.0, 10.0, 80.0, 80.0), 0.9)
    }

    /// Happy path through every stage.
    #[test]
    fn detect_adjust_confirm() {
        let mut flow = CropWorkflow::default();
        let ticket = flow.begin_detection(dims()).unwrap();
        assert_eq!(flow.stage(), CropStage::Detecting);

        assert_eq!(
            flow.complete_detection(ticket, suggestion()),
            Some(CropStage::Suggested)
        );
        assert_eq!(flow.crop(), suggestion().crop_area);

        let adjusted = CropArea::new(12.0, 10.0, 70.0, 80.0);
        flow.adjust(adjusted).unwrap();
        assert_eq!(flow.stage(), CropStage::Adjusting);

        flow.confirm(adjusted).unwrap();
        assert_eq!(flow.stage(), CropStage::Confirmed);
        assert_eq!(flow.confirmed(), Some(adjusted));
    }

    #[test]
    fn inconclusive_detection_goes_manual_with_full_image() {
        let mut flow = CropWorkflow::default();
        let ticket = flow.begin_detection(dims()).unwrap();
        assert_eq!(
            flow.complete_detection(ticket, DetectionResult::not_detected()),
            Some(CropStage::Manual)
        );
        assert_eq!(flow.crop(), CropArea::full());
    }

    #[test]
    fn low_confidence_detection_goes_manual() {
        let mut flow = CropWorkflow::default();
        let ticket = flow.begin_detection(dims()).unwrap();
        let weak = DetectionResult::found(CropArea::new(10.0, 10.0, 50.0, 50.0), 0.1);
        assert_eq!(flow.complete_detection(ticket, weak), Some(CropStage::Manual));
        assert_eq!(flow.detection(), Some(&weak));
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut flow = CropWorkflow::default();
        let old = flow.begin_detection(dims()).unwrap();
        flow.cancel();
        let current = flow.begin_detection(ImageDimensions::new(100, 100)).unwrap();

        assert_eq!(flow.complete_detection(old, suggestion()), None);
        assert_eq!(flow.stage(), CropStage::Detecting);
        assert!(flow.detection().is_none());

        assert_eq!(
            flow.complete_detection(current, suggestion()),
            Some(CropStage::Suggested)
        );
    }

    #[test]
    fn result_after_cancel_leaves_idle() {
        let mut flow = CropWorkflow::default();
        let ticket = flow.begin_detection(dims()).unwrap();
        flow.cancel();
        assert_eq!(flow.complete_detection(ticket, suggestion()), None);
        assert_eq!(flow.stage(), CropStage::Idle);
        assert_eq!(flow.dimensions(), None);
    }

    #[test]
    fn recrop_returns_to_adjusting() {
        let mut flow = CropWorkflow::default();
        let ticket = flow.begin_detection(dims()).unwrap();
        flow.complete_detection(ticket, suggestion());
        flow.adjust(suggestion().crop_area).unwrap();
        flow.confirm(suggestion().crop_area).unwrap();

        flow.recrop().unwrap();
        assert_eq!(flow.stage(), CropStage::Adjusting);
        assert_eq!(flow.crop(), suggestion().crop_area);
        assert_eq!(flow.confirmed(), None);
    }

    #[test]
    fn illegal_transitions_are_errors() {
        let mut flow = CropWorkflow::default();
        assert!(matches!(
            flow.confirm(CropArea::full()),
            Err(SnapcropError::InvalidTransition { .. })
        ));
        assert!(flow.recrop().is_err());
        assert!(flow.adjust(CropArea::full()).is_err());

        flow.begin_detection(dims()).unwrap();
        // Already detecting.
        let err = flow.begin_detection(dims()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid crop workflow transition: detecting -> detecting"
        );
        // Confirming straight from a suggestion skips adjusting.
        assert!(flow.confirm(CropArea::full()).is_err());
    }

    #[test]
    fn invalid_crop_is_rejected_while_adjusting() {
        let mut flow = CropWorkflow::default();
        let ticket = flow.begin_detection(dims()).unwrap();
        flow.complete_detection(ticket, DetectionResult::not_detected());
        let err = flow.adjust(CropArea::new(90.0, 0.0, 20.0, 10.0)).unwrap_err();
        assert!(matches!(err, SnapcropError::InvalidCropArea(_)));
        assert_eq!(flow.stage(), CropStage::Manual);
    }
}
