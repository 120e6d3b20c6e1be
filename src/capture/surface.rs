// Capture surface abstraction: where frames come from.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PREVIEW_FILE_NAME: &str = "photo.jpg";
pub const PREVIEW_CONTENT_TYPE: &str = "image/jpeg";

/// One acquired photograph.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Opaque handle to the local resource (file path, content URI, ...)
    pub reference: String,
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl CapturedFrame {
    pub fn jpeg(reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            reference: reference.into(),
            bytes,
            file_name: PREVIEW_FILE_NAME.to_string(),
            content_type: PREVIEW_CONTENT_TYPE.to_string(),
        }
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("reference", &self.reference)
            .field("bytes", &self.bytes.len())
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraPermission {
    Granted,
    Denied { can_ask_again: bool },
    Undetermined,
}

impl CameraPermission {
    pub fn is_granted(self) -> bool {
        matches!(self, CameraPermission::Granted)
    }

    /// Whether asking the user again could change the answer.
    pub fn can_request(self) -> bool {
        matches!(
            self,
            CameraPermission::Undetermined | CameraPermission::Denied { can_ask_again: true }
        )
    }
}

/// A camera or anything else able to hand over a photograph.
#[async_trait]
pub trait CaptureSurface: Send + Sync {
    /// Current permission state, without prompting.
    async fn permission(&self) -> CameraPermission;

    /// Prompt for permission and return the resulting state.
    async fn request_permission(&self) -> CameraPermission;

    /// Take one picture. `Ok(None)` means the surface produced nothing.
    async fn acquire_frame(&self) -> Result<Option<CapturedFrame>>;
}

/// Capture surface backed by an image file on disk.
#[derive(Debug, Clone)]
pub struct StillImageSurface {
    path: PathBuf,
}

impl StillImageSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CaptureSurface for StillImageSurface {
    async fn permission(&self) -> CameraPermission {
        CameraPermission::Granted
    }

    async fn request_permission(&self) -> CameraPermission {
        CameraPermission::Granted
    }

    async fn acquire_frame(&self) -> Result<Option<CapturedFrame>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read image {}", self.path.display()))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(CapturedFrame::jpeg(
            self.path.display().to_string(),
            bytes,
        )))
    }
}
