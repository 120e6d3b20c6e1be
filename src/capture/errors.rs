use thiserror::Error;

use super::session::CapturePhase;
use crate::decode::DecodeError;
use crate::http::errors::NetworkError;

/// Everything `capture()`, `retake()` and `commit()` can report to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no photo")]
    NoFrame,

    #[error("camera permission not granted")]
    PermissionDenied,

    #[error("capture surface failed: {0}")]
    Surface(String),

    /// Rejected because the session is in the wrong phase. No state changed.
    #[error("cannot {operation} while {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: CapturePhase,
    },

    #[error("{0}")]
    PreviewNetwork(NetworkError),

    #[error("{0}")]
    PreviewDecode(DecodeError),

    #[error("{0}")]
    Upload(NetworkError),
}

impl CaptureError {
    /// Heading for the blocking notification shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            CaptureError::PreviewNetwork(_) | CaptureError::PreviewDecode(_) => "Preview error",
            CaptureError::Upload(_) => "Upload error",
            CaptureError::NoFrame
            | CaptureError::PermissionDenied
            | CaptureError::Surface(_)
            | CaptureError::InvalidPhase { .. } => "Capture error",
        }
    }

    /// HTTP status behind an upload or preview failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            CaptureError::PreviewNetwork(e) | CaptureError::Upload(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_preview_error(&self) -> bool {
        matches!(self, CaptureError::PreviewNetwork(_) | CaptureError::PreviewDecode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_follow_failure_stage() {
        let upload = CaptureError::Upload(NetworkError::Status {
            status: 500,
            body_prefix: "db error".into(),
        });
        assert_eq!(upload.title(), "Upload error");
        assert_eq!(upload.to_string(), "HTTP 500 db error");
        assert_eq!(upload.status(), Some(500));

        let decode = CaptureError::PreviewDecode(DecodeError::NoStrategyMatched {
            body_prefix: String::new(),
        });
        assert_eq!(decode.title(), "Preview error");
        assert!(decode.is_preview_error());

        assert_eq!(CaptureError::NoFrame.title(), "Capture error");
    }

    #[test]
    fn test_invalid_phase_message() {
        let err = CaptureError::InvalidPhase {
            operation: "commit",
            phase: CapturePhase::Idle,
        };
        assert_eq!(err.to_string(), "cannot commit while idle");
    }
}
