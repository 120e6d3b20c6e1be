// MixMatch client core
// Capture/preview/commit and gallery workflows over the MixMatch image API

pub mod capture;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod decode;
pub mod http;
pub mod observability;
pub mod telemetry;

// Re-export key types for easy access
pub use capture::{
    CameraPermission, CaptureError, CapturePhase, CaptureSession, CaptureSurface, CaptureWorkflow,
    CapturedFrame, CommitReceipt, StillImageSurface,
};
pub use catalog::{
    CatalogItem, CatalogState, CatalogWorkflow, DeleteOutcome, FetchOutcome, ResolvedUrls,
    ServerAck,
};
pub use config::MixMatchConfig;
pub use decode::{
    decode_image_payload, decode_item_page, decode_saved_item, CutoutPayload, DecodeError,
    DecodedPayload, ImageStrategy,
};
pub use http::{HttpImageApi, ImageApi, NetworkError, RawResponse};
pub use observability::{create_workflow_span, ApiMetrics, OperationTimer};
pub use telemetry::{generate_correlation_id, init_telemetry};
