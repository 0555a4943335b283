// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Snapcrop cropper: turns detection results into cropper-widget placements
// and drives the detect / adjust / confirm workflow.

pub mod adapter;
pub mod controller;
pub mod widget;
pub mod workflow;

pub use adapter::{CropAdapter, WidgetPlacement};
pub use controller::{CropController, DetectionOutcome};
pub use widget::{ConfirmedCrop, CropperWidget, ViewportCropper};
pub use workflow::{CropStage, CropWorkflow, DetectionTicket};
