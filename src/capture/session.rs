use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::decode::CutoutPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CapturePhase {
    Idle,
    Capturing,
    AwaitingPreview,
    PreviewReady,
    Uploading,
}

impl std::fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CapturePhase::Idle => "idle",
            CapturePhase::Capturing => "capturing",
            CapturePhase::AwaitingPreview => "awaiting preview",
            CapturePhase::PreviewReady => "preview ready",
            CapturePhase::Uploading => "uploading",
        };
        f.write_str(name)
    }
}

/// The single capture in progress.
///
/// Payload fields live inside the variants that allow them, so a cut-out can
/// only exist while previewing or uploading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureSession {
    #[default]
    Idle,
    Capturing,
    AwaitingPreview {
        original: String,
    },
    PreviewReady {
        original: String,
        cutout: CutoutPayload,
    },
    Uploading {
        original: String,
        cutout: CutoutPayload,
    },
}

impl CaptureSession {
    pub fn phase(&self) -> CapturePhase {
        match self {
            CaptureSession::Idle => CapturePhase::Idle,
            CaptureSession::Capturing => CapturePhase::Capturing,
            CaptureSession::AwaitingPreview { .. } => CapturePhase::AwaitingPreview,
            CaptureSession::PreviewReady { .. } => CapturePhase::PreviewReady,
            CaptureSession::Uploading { .. } => CapturePhase::Uploading,
        }
    }

    pub fn original_image_ref(&self) -> Option<&str> {
        match self {
            CaptureSession::AwaitingPreview { original }
            | CaptureSession::PreviewReady { original, .. }
            | CaptureSession::Uploading { original, .. } => Some(original),
            CaptureSession::Idle | CaptureSession::Capturing => None,
        }
    }

    pub fn cutout_payload(&self) -> Option<&CutoutPayload> {
        match self {
            CaptureSession::PreviewReady { cutout, .. } | CaptureSession::Uploading { cutout, .. } => {
                Some(cutout)
            }
            _ => None,
        }
    }
}

/// One recorded phase change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    pub from: CapturePhase,
    pub to: CapturePhase,
    pub at: DateTime<Utc>,
}
