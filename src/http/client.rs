use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use reqwest::multipart::{Form, Part};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::api::{join_url, ImageApi, RawResponse};
use super::errors::{body_prefix, NetworkError};
use crate::capture::CapturedFrame;
use crate::config::{HttpConfig, ServerConfig};
use crate::decode::CutoutPayload;
use crate::observability::{ApiMetrics, OperationTimer};

pub const PREVIEW_PATH: &str = "/api/preview";
pub const UPLOAD_PATH: &str = "/api/upload_base64";
pub const ITEMS_PATH: &str = "/api/items";

/// Rate-limited reqwest client for the MixMatch endpoints
#[derive(Debug)]
pub struct HttpImageApi {
    client: reqwest::Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    metrics: Arc<ApiMetrics>,
    base_url: String,
    body_prefix_len: usize,
}

impl HttpImageApi {
    pub fn new(server: &ServerConfig, http: &HttpConfig) -> Result<Self> {
        let rate = NonZeroU32::new(http.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(http.burst).unwrap_or(rate);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(rate).allow_burst(burst)));

        let mut builder = reqwest::Client::builder();
        if http.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(http.timeout_seconds));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            rate_limiter,
            metrics: Arc::new(ApiMetrics::new()),
            base_url: server.base_url.trim_end_matches('/').to_string(),
            body_prefix_len: http.body_prefix_len,
        })
    }

    pub fn metrics(&self) -> Arc<ApiMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with rate limiting and collect status + text body.
    async fn execute(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<RawResponse, NetworkError> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        self.metrics.record_request();
        let timer = OperationTimer::new(endpoint);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                self.metrics.record_transport_error();
                timer.finish(None);
                return Err(transport_error(endpoint, &e));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                self.metrics.record_transport_error();
                timer.finish(Some(status));
                return Err(transport_error(endpoint, &e));
            }
        };

        self.metrics.record_status(status);
        timer.finish(Some(status));
        debug!(
            endpoint,
            status,
            body = %body_prefix(&body, self.body_prefix_len),
            "Response received"
        );

        Ok(RawResponse { status, body })
    }
}

fn transport_error(endpoint: &str, err: &reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else {
        NetworkError::transport(endpoint, err)
    }
}

#[async_trait]
impl ImageApi for HttpImageApi {
    async fn preview(&self, frame: &CapturedFrame) -> Result<RawResponse, NetworkError> {
        let part = Part::bytes(frame.bytes.clone())
            .file_name(frame.file_name.clone())
            .mime_str(&frame.content_type)
            .map_err(|e| NetworkError::transport(PREVIEW_PATH, e))?;
        let form = Form::new().part("image", part);

        let request = self.client.post(self.url(PREVIEW_PATH)).multipart(form);
        self.execute(PREVIEW_PATH, request).await
    }

    async fn upload(&self, payload: &CutoutPayload) -> Result<RawResponse, NetworkError> {
        let request = self
            .client
            .post(self.url(UPLOAD_PATH))
            .json(&serde_json::json!({ "png_base64": payload.as_str() }));
        self.execute(UPLOAD_PATH, request).await
    }

    async fn list_items(&self, limit: usize, offset: usize) -> Result<RawResponse, NetworkError> {
        let request = self
            .client
            .get(self.url(ITEMS_PATH))
            .query(&[("limit", limit), ("offset", offset)]);
        self.execute(ITEMS_PATH, request).await
    }

    async fn delete_item(&self, id: &str) -> Result<RawResponse, NetworkError> {
        let path = format!("{ITEMS_PATH}/{}", urlencoding::encode(id));
        let request = self.client.delete(self.url(&path));
        self.execute(&path, request).await
    }

    fn resolve_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn body_prefix_len(&self) -> usize {
        self.body_prefix_len
    }
}
