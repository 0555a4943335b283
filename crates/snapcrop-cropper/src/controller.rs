// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop controller: async glue between image loading, paper detection, the
// workflow state machine and the cropper widget.
//
// Decoding, detection and JPEG encoding are CPU-bound and run on tokio's
// blocking pool. The session lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use image::DynamicImage;
use snapcrop_core::error::{Result, SnapcropError};
use snapcrop_core::human_errors::{DETECTION_FAILED_MESSAGE, detection_message};
use snapcrop_core::{AppConfig, CropArea, CropperConfig, DetectionResult, ImageDimensions};
use snapcrop_vision::image::loader::{decode_bytes, decode_data_uri};
use snapcrop_vision::{CroppedImage, PaperDetector, PixelBuffer, create_cropped_image};
use tracing::{debug, info, instrument, warn};

use crate::adapter::{CropAdapter, WidgetPlacement};
use crate::widget::ConfirmedCrop;
use crate::workflow::{CropStage, CropWorkflow};

/// What the UI needs once detection for an image has finished.
#[derive(Debug, Clone)]
pub struct DetectionOutcome {
    /// `Suggested` or `Manual`.
    pub stage: CropStage,
    pub result: DetectionResult,
    /// Widget placement for the crop now shown.
    pub placement: WidgetPlacement,
    /// Status line for the user.
    pub message: &'static str,
}

struct Session {
    workflow: CropWorkflow,
    source: Option<Arc<DynamicImage>>,
}

/// Shared crop controller.
///
/// Cheaply cloneable; clones drive the same session.
#[derive(Clone)]
pub struct CropController {
    detector: Arc<PaperDetector>,
    config: CropperConfig,
    session: Arc<Mutex<Session>>,
}

impl CropController {
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.cropper.validate()?;
        let detector = PaperDetector::new(config.detection.clone())?;
        Ok(Self::with_detector(detector, config.cropper.clone()))
    }

    pub fn with_detector(detector: PaperDetector, config: CropperConfig) -> Self {
        Self {
            detector: Arc::new(detector),
            session: Arc::new(Mutex::new(Session {
                workflow: CropWorkflow::new(config.min_confidence),
                source: None,
            })),
            config,
        }
    }

    pub fn stage(&self) -> Result<CropStage> {
        Ok(self.lock()?.workflow.stage())
    }

    /// Snapshot of the workflow state.
    pub fn workflow(&self) -> Result<CropWorkflow> {
        Ok(self.lock()?.workflow.clone())
    }

    // -- Loading and detection -----------------------------------------------

    /// Decode a data URI and run detection on it.
    ///
    /// A decode failure is returned as `SnapcropError::Load` and leaves the
    /// session untouched. `Ok(None)` means the session was cancelled or
    /// replaced while detection ran.
    pub async fn open_data_uri(&self, uri: String) -> Result<Option<DetectionOutcome>> {
        let image = run_blocking(move || decode_data_uri(&uri)).await??;
        self.open_image(image).await
    }

    /// Decode encoded image bytes and run detection on them.
    pub async fn open_bytes(&self, data: Vec<u8>) -> Result<Option<DetectionOutcome>> {
        let image = run_blocking(move || decode_bytes(&data)).await??;
        self.open_image(image).await
    }

    /// Start a new crop session for `image` and detect its paper region.
    ///
    /// Any previous session is cancelled first.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub async fn open_image(&self, image: DynamicImage) -> Result<Option<DetectionOutcome>> {
        let detector = Arc::clone(&self.detector);
        self.open_image_with(image, move |image| {
            let buffer = PixelBuffer::from_dynamic(image)?;
            Ok(detector.detect(&buffer))
        })
        .await
    }

    async fn open_image_with<F>(
        &self,
        image: DynamicImage,
        detect: F,
    ) -> Result<Option<DetectionOutcome>>
    where
        F: FnOnce(&DynamicImage) -> Result<DetectionResult> + Send + 'static,
    {
        let dims = ImageDimensions::new(image.width(), image.height());
        let image = Arc::new(image);

        let ticket = {
            let mut session = self.lock()?;
            if session.workflow.stage() != CropStage::Idle {
                debug!(stage = %session.workflow.stage(), "Replacing active crop session");
                session.workflow.cancel();
            }
            let ticket = session.workflow.begin_detection(dims)?;
            session.source = Some(Arc::clone(&image));
            ticket
        };

        let finished = self.run_detection(image, detect).await;
        let result = finished.unwrap_or_else(DetectionResult::not_detected);

        let mut session = self.lock()?;
        let Some(stage) = session.workflow.complete_detection(ticket, result) else {
            return Ok(None);
        };
        let placement = self.placement_for(&session.workflow)?;

        Ok(Some(DetectionOutcome {
            stage,
            result,
            placement,
            message: match finished {
                Some(result) => detection_message(&result, self.config.min_confidence),
                None => DETECTION_FAILED_MESSAGE,
            },
        }))
    }

    /// `None` when the detection run itself failed: a panic, a timeout or a
    /// pixel conversion error. Callers treat that as `not_detected()`.
    async fn run_detection<F>(
        &self,
        image: Arc<DynamicImage>,
        detect: F,
    ) -> Option<DetectionResult>
    where
        F: FnOnce(&DynamicImage) -> Result<DetectionResult> + Send + 'static,
    {
        let task = run_blocking(move || detect(&image));

        let joined = match self.config.detection_timeout_ms {
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(timeout_ms = ms, "Paper detection timed out");
                    return None;
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(result)) => Some(result),
            Ok(Err(e)) | Err(e) => {
                warn!(error = %e, "Paper detection failed");
                None
            }
        }
    }

    // -- Adjusting ------------------------------------------------------------

    /// Widget placement for the crop currently shown.
    pub fn placement(&self) -> Result<WidgetPlacement> {
        let session = self.lock()?;
        self.placement_for(&session.workflow)
    }

    /// Record a crop chosen by the user and return its placement.
    pub fn adjust(&self, area: CropArea) -> Result<WidgetPlacement> {
        let mut session = self.lock()?;
        session.workflow.adjust(area)?;
        self.placement_for(&session.workflow)
    }

    /// Re-open a confirmed crop for adjusting.
    pub fn recrop(&self) -> Result<WidgetPlacement> {
        let mut session = self.lock()?;
        session.workflow.recrop()?;
        self.placement_for(&session.workflow)
    }

    // -- Confirming -----------------------------------------------------------

    /// Confirm the widget's selection and produce the cropped JPEG.
    ///
    /// The workflow only moves to `Confirmed` once the JPEG exists. An
    /// encoding failure leaves the session where it was, so the user can
    /// adjust and confirm again.
    pub async fn confirm(&self, crop: &ConfirmedCrop) -> Result<CroppedImage> {
        let (area, source, generation) = {
            let session = self.lock()?;
            let area = self.adapter_for(&session.workflow)?.from_confirmed(crop);
            // Check the transition up front without committing it.
            confirm_transition(&mut session.workflow.clone(), area)?;
            let source = session
                .source
                .clone()
                .ok_or(SnapcropError::DimensionsUnknown)?;
            (area, source, session.workflow.generation())
        };

        let quality = self.config.jpeg_quality;
        let cropped = run_blocking(move || create_cropped_image(&source, &area, quality)).await??;

        let mut session = self.lock()?;
        if session.workflow.generation() != generation {
            return Err(SnapcropError::Task(
                "crop session was replaced while encoding".into(),
            ));
        }
        confirm_transition(&mut session.workflow, area)?;
        info!(
            name = %cropped.file.name,
            dimensions = %cropped.dimensions,
            "Cropped image ready"
        );
        Ok(cropped)
    }

    /// Drop the current image and any in-flight detection.
    pub fn cancel(&self) -> Result<()> {
        let mut session = self.lock()?;
        session.workflow.cancel();
        session.source = None;
        Ok(())
    }

    // -- Helpers ----------------------------------------------------------------

    fn adapter_for(&self, workflow: &CropWorkflow) -> Result<CropAdapter> {
        CropAdapter::new(workflow.dimensions(), &self.config)
    }

    fn placement_for(&self, workflow: &CropWorkflow) -> Result<WidgetPlacement> {
        self.adapter_for(workflow)?.to_widget(&workflow.crop())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| SnapcropError::Task("crop session lock poisoned".into()))
    }
}

/// Confirm `area`, passing through `Adjusting` when the user accepted the
/// suggestion or the manual default unchanged.
fn confirm_transition(workflow: &mut CropWorkflow, area: CropArea) -> Result<()> {
    if workflow.stage() != CropStage::Adjusting {
        workflow.adjust(area)?;
    }
    workflow.confirm(area)
}

/// Run `f` on the blocking pool; a panic or cancellation becomes `Task`.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SnapcropError::Task(e.to_string()))
}
