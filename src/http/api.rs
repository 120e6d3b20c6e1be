// The network seam shared by both workflows.
// Implementations return raw status + body; interpreting them is the workflows' job.

use async_trait::async_trait;

use crate::capture::CapturedFrame;
use crate::decode::CutoutPayload;
use crate::http::errors::{body_prefix, NetworkError};

/// Status and text body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a 2xx response, or a `NetworkError::Status` carrying the body prefix.
    pub fn into_success(self, prefix_len: usize) -> Result<String, NetworkError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(NetworkError::Status {
                status: self.status,
                body_prefix: body_prefix(&self.body, prefix_len),
            })
        }
    }
}

/// Remote endpoints the client talks to.
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// `POST /api/preview` with the frame as multipart field `image`.
    async fn preview(&self, frame: &CapturedFrame) -> Result<RawResponse, NetworkError>;

    /// `POST /api/upload_base64` with `{ "png_base64": ... }`.
    async fn upload(&self, payload: &CutoutPayload) -> Result<RawResponse, NetworkError>;

    /// `GET /api/items?limit=&offset=`.
    async fn list_items(&self, limit: usize, offset: usize) -> Result<RawResponse, NetworkError>;

    /// `DELETE /api/items/{id}`.
    async fn delete_item(&self, id: &str) -> Result<RawResponse, NetworkError>;

    /// Base URL joined with a server-relative path.
    fn resolve_url(&self, path: &str) -> String;

    /// Characters of an error body worth showing to a user.
    fn body_prefix_len(&self) -> usize {
        crate::http::errors::DEFAULT_BODY_PREFIX_LEN
    }
}

/// Joins `base` and `path` the way display URLs are built.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let base = base.trim_end_matches('/');
    if path.is_empty() || path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_concatenates_relative_paths() {
        assert_eq!(
            join_url("http://localhost:8080", "/media/a_thumb.png"),
            "http://localhost:8080/media/a_thumb.png"
        );
        assert_eq!(
            join_url("http://localhost:8080/", "/media/a.png"),
            "http://localhost:8080/media/a.png"
        );
        assert_eq!(
            join_url("http://localhost:8080", "media/a.png"),
            "http://localhost:8080/media/a.png"
        );
    }

    #[test]
    fn test_join_url_keeps_absolute_urls() {
        assert_eq!(
            join_url("http://localhost:8080", "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_into_success_surfaces_body_prefix() {
        let ok = RawResponse::new(201, "{}").into_success(120);
        assert_eq!(ok.unwrap(), "{}");

        let err = RawResponse::new(500, "x".repeat(300)).into_success(120).unwrap_err();
        match err {
            NetworkError::Status { status, body_prefix } => {
                assert_eq!(status, 500);
                assert_eq!(body_prefix.len(), 120);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
