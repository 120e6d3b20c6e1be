// Capture workflow: take a photo, preview the cut-out, commit or retake.

pub mod errors;
pub mod session;
pub mod surface;
pub mod workflow;

#[cfg(test)]
pub mod mocks;

pub use errors::CaptureError;
pub use session::{CapturePhase, CaptureSession, PhaseTransition};
pub use surface::{CameraPermission, CaptureSurface, CapturedFrame, StillImageSurface};
pub use workflow::{CaptureWorkflow, CommitReceipt};
