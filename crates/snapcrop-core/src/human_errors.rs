// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for the crop screen.
//
// Every technical error is mapped to plain English with a clear suggestion,
// and every detection outcome gets the banner text the crop screen shows
// above the image.

use crate::error::SnapcropError;
use crate::types::DetectionResult;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Try again and it will probably work.
    Transient,
    /// User must do something (pick another photo, retake the picture).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the system should auto-retry.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `SnapcropError` into a `HumanError` a child drawing on paper can follow.
pub fn humanize_error(err: &SnapcropError) -> HumanError {
    match err {
        SnapcropError::Load(_) => HumanError {
            message: "We couldn't open that picture.".into(),
            suggestion: "Try taking the photo again, or pick a JPEG or PNG picture.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SnapcropError::Encode(_) => HumanError {
            message: "We couldn't save the cropped picture.".into(),
            suggestion: "Try cropping again. If this keeps happening, pick a smaller picture.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SnapcropError::DimensionsUnknown => HumanError {
            message: "The picture is still loading.".into(),
            suggestion: "Wait a moment for the picture to appear, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SnapcropError::InvalidCropArea(_) => HumanError {
            message: "That crop box doesn't fit inside the picture.".into(),
            suggestion: "Drag the picture so the box covers your drawing, then confirm.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        SnapcropError::InvalidTransition { .. } | SnapcropError::Task(_) => HumanError {
            message: "Something went wrong while cropping.".into(),
            suggestion: "Start again by choosing your picture once more.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        SnapcropError::Config(detail) => HumanError {
            message: "The crop settings are not valid.".into(),
            suggestion: format!("Fix the settings file and try again. (Detail: {detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        SnapcropError::Io(_) | SnapcropError::Serialization(_) => HumanError {
            message: "The app had a problem reading or writing a file.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Banner text for a finished detection.
///
/// A result only counts as a suggestion when it beats `min_confidence`;
/// otherwise the user is invited to crop by hand.
pub fn detection_message(result: &DetectionResult, min_confidence: f64) -> &'static str {
    if result.is_suggestion(min_confidence) {
        "Paper detected! Adjust if needed."
    } else {
        "Could not detect paper. Please crop manually."
    }
}

/// Banner text shown while detection is running.
pub const DETECTING_MESSAGE: &str = "Detecting paper...";

/// Banner text when the picture could not be analysed at all.
pub const DETECTION_FAILED_MESSAGE: &str = "Detection failed. Please crop manually.";
