// Capture -> preview -> commit orchestration.
//
// The session lock is only held for check-and-set sections, never across a
// network or capture await, so a second call made while the first is
// suspended observes the guard and is rejected.

use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn, Instrument};

use super::errors::CaptureError;
use super::session::{CapturePhase, CaptureSession, PhaseTransition};
use super::surface::{CaptureSurface, CapturedFrame};
use crate::catalog::CatalogItem;
use crate::decode::{decode_image_payload, decode_saved_item, CutoutPayload};
use crate::http::ImageApi;
use crate::observability::{create_workflow_span, ApiMetrics};
use crate::telemetry::generate_correlation_id;

const HISTORY_LIMIT: usize = 64;

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Item echoed by the server, when its body was readable.
    pub saved_item: Option<CatalogItem>,
}

#[derive(Debug, Default)]
struct CaptureInner {
    session: CaptureSession,
    history: VecDeque<PhaseTransition>,
}

impl CaptureInner {
    fn transition(&mut self, next: CaptureSession) {
        let from = self.session.phase();
        let to = next.phase();
        self.session = next;
        info!(from = %from, to = %to, "Capture phase transition");

        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(PhaseTransition {
            from,
            to,
            at: Utc::now(),
        });
    }
}

pub struct CaptureWorkflow {
    api: Arc<dyn ImageApi>,
    surface: Arc<dyn CaptureSurface>,
    metrics: Option<Arc<ApiMetrics>>,
    inner: Mutex<CaptureInner>,
}

impl std::fmt::Debug for CaptureWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureWorkflow")
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl CaptureWorkflow {
    pub fn new(api: Arc<dyn ImageApi>, surface: Arc<dyn CaptureSurface>) -> Self {
        Self {
            api,
            surface,
            metrics: None,
            inner: Mutex::new(CaptureInner::default()),
        }
    }

    /// Count decode fallbacks into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<ApiMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn phase(&self) -> CapturePhase {
        self.inner.lock().await.session.phase()
    }

    pub async fn session(&self) -> CaptureSession {
        self.inner.lock().await.session.clone()
    }

    pub async fn cutout_payload(&self) -> Option<CutoutPayload> {
        self.inner.lock().await.session.cutout_payload().cloned()
    }

    pub async fn history(&self) -> Vec<PhaseTransition> {
        self.inner.lock().await.history.iter().cloned().collect()
    }

    /// Take a photo and run the preview round-trip.
    ///
    /// Only valid while idle. Any failure returns the session to idle with
    /// nothing retained.
    pub async fn capture(&self) -> Result<CutoutPayload, CaptureError> {
        let span = create_workflow_span("capture", "capture", &generate_correlation_id());
        self.run_capture().instrument(span).await
    }

    async fn run_capture(&self) -> Result<CutoutPayload, CaptureError> {
        {
            let mut inner = self.inner.lock().await;
            let phase = inner.session.phase();
            if phase != CapturePhase::Idle {
                warn!(%phase, "Capture rejected, session busy");
                return Err(CaptureError::InvalidPhase {
                    operation: "capture",
                    phase,
                });
            }
            inner.transition(CaptureSession::Capturing);
        }

        let frame = match self.acquire_frame().await {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Capture failed");
                self.inner.lock().await.transition(CaptureSession::Idle);
                return Err(e);
            }
        };

        let original = frame.reference.clone();
        self.inner
            .lock()
            .await
            .transition(CaptureSession::AwaitingPreview {
                original: original.clone(),
            });

        let outcome = self.request_preview(&frame).await;
        drop(frame);

        let mut inner = self.inner.lock().await;
        match outcome {
            Ok(cutout) => {
                inner.transition(CaptureSession::PreviewReady {
                    original,
                    cutout: cutout.clone(),
                });
                Ok(cutout)
            }
            Err(e) => {
                error!(error = %e, "Preview failed, discarding capture");
                inner.transition(CaptureSession::Idle);
                Err(e)
            }
        }
    }

    async fn acquire_frame(&self) -> Result<CapturedFrame, CaptureError> {
        let mut permission = self.surface.permission().await;
        if !permission.is_granted() && permission.can_request() {
            permission = self.surface.request_permission().await;
        }
        if !permission.is_granted() {
            return Err(CaptureError::PermissionDenied);
        }

        match self.surface.acquire_frame().await {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => Err(CaptureError::NoFrame),
            Err(e) => Err(CaptureError::Surface(format!("{e:#}"))),
        }
    }

    async fn request_preview(&self, frame: &CapturedFrame) -> Result<CutoutPayload, CaptureError> {
        let response = self
            .api
            .preview(frame)
            .await
            .map_err(CaptureError::PreviewNetwork)?;
        info!(status = response.status, "Preview response received");

        let body = response
            .into_success(self.api.body_prefix_len())
            .map_err(CaptureError::PreviewNetwork)?;
        let decoded = decode_image_payload(&body).map_err(CaptureError::PreviewDecode)?;

        if decoded.is_fallback() {
            if let Some(metrics) = &self.metrics {
                metrics.record_decode_fallback();
            }
        }
        Ok(decoded.payload)
    }

    /// Throw away the previewed cut-out and go back to idle.
    pub async fn retake(&self) -> Result<(), CaptureError> {
        let mut inner = self.inner.lock().await;
        match inner.session.phase() {
            CapturePhase::PreviewReady => {
                inner.transition(CaptureSession::Idle);
                Ok(())
            }
            phase => Err(CaptureError::InvalidPhase {
                operation: "retake",
                phase,
            }),
        }
    }

    /// Persist the previewed cut-out.
    ///
    /// On failure the preview is restored so the commit can be retried
    /// without capturing again.
    pub async fn commit(&self) -> Result<CommitReceipt, CaptureError> {
        let span = create_workflow_span("capture", "commit", &generate_correlation_id());
        self.run_commit().instrument(span).await
    }

    async fn run_commit(&self) -> Result<CommitReceipt, CaptureError> {
        let (original, cutout) = {
            let mut inner = self.inner.lock().await;
            let (original, cutout) = match &inner.session {
                CaptureSession::PreviewReady { original, cutout } => (original.clone(), cutout.clone()),
                other => {
                    let phase = other.phase();
                    warn!(%phase, "Commit rejected");
                    return Err(CaptureError::InvalidPhase {
                        operation: "commit",
                        phase,
                    });
                }
            };
            inner.transition(CaptureSession::Uploading {
                original: original.clone(),
                cutout: cutout.clone(),
            });
            (original, cutout)
        };

        let result = match self.api.upload(&cutout).await {
            Ok(response) => response.into_success(self.api.body_prefix_len()),
            Err(e) => Err(e),
        };

        let mut inner = self.inner.lock().await;
        match result {
            Ok(body) => {
                let saved_item = decode_saved_item(&body);
                inner.transition(CaptureSession::Idle);
                info!(saved_id = ?saved_item.as_ref().map(|item| item.id.as_str()), "Cut-out saved");
                Ok(CommitReceipt { saved_item })
            }
            Err(e) => {
                warn!(error = %e, "Upload failed, keeping preview for retry");
                inner.transition(CaptureSession::PreviewReady { original, cutout });
                Err(CaptureError::Upload(e))
            }
        }
    }
}
