// Scripted capture surface for unit tests

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use super::surface::{CameraPermission, CaptureSurface, CapturedFrame};

#[derive(Debug)]
pub struct MockCaptureSurface {
    frame: Option<CapturedFrame>,
    permission: Mutex<CameraPermission>,
    granted_on_request: CameraPermission,
    permission_requests: Mutex<u32>,
}

impl MockCaptureSurface {
    /// Permission granted; every acquisition returns a small JPEG stub at `reference`.
    pub fn with_frame(reference: &str) -> Self {
        Self {
            frame: Some(CapturedFrame::jpeg(reference, vec![0xFF, 0xD8, 0xFF, 0xD9])),
            permission: Mutex::new(CameraPermission::Granted),
            granted_on_request: CameraPermission::Granted,
            permission_requests: Mutex::new(0),
        }
    }

    /// Permission granted but the shutter never produces anything.
    pub fn empty() -> Self {
        Self {
            frame: None,
            ..Self::with_frame("unused")
        }
    }

    pub fn with_permission(self, current: CameraPermission, on_request: CameraPermission) -> Self {
        *self.permission.lock().unwrap() = current;
        Self {
            granted_on_request: on_request,
            ..self
        }
    }

    pub fn permission_requests(&self) -> u32 {
        *self.permission_requests.lock().unwrap()
    }
}

#[async_trait]
impl CaptureSurface for MockCaptureSurface {
    async fn permission(&self) -> CameraPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> CameraPermission {
        *self.permission_requests.lock().unwrap() += 1;
        let mut permission = self.permission.lock().unwrap();
        *permission = self.granted_on_request;
        *permission
    }

    async fn acquire_frame(&self) -> Result<Option<CapturedFrame>> {
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_request_updates_permission() {
        let surface = MockCaptureSurface::with_frame("a")
            .with_permission(CameraPermission::Undetermined, CameraPermission::Granted);
        assert_eq!(surface.permission().await, CameraPermission::Undetermined);
        assert_eq!(surface.request_permission().await, CameraPermission::Granted);
        assert_eq!(surface.permission().await, CameraPermission::Granted);
        assert_eq!(surface.permission_requests(), 1);
    }
}
