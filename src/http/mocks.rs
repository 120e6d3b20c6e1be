// Scripted ImageApi for unit tests - no network

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::api::{join_url, ImageApi, RawResponse};
use super::errors::NetworkError;
use crate::capture::CapturedFrame;
use crate::decode::CutoutPayload;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Preview { file_name: String, bytes: usize },
    Upload { payload: String },
    List { limit: usize, offset: usize },
    Delete { id: String },
}

type Scripted = Mutex<VecDeque<Result<RawResponse, NetworkError>>>;

/// Replays queued responses per endpoint and records every call.
///
/// Unscripted calls get a neutral default: 500 for preview, `{}` for upload,
/// `[]` for listing and 204 for delete.
#[derive(Debug, Default)]
pub struct MockImageApi {
    previews: Scripted,
    uploads: Scripted,
    lists: Scripted,
    deletes: Scripted,
    calls: Mutex<Vec<ApiCall>>,
    latency: Option<Duration>,
}

impl MockImageApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspend every call for `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn push_preview(&self, response: Result<RawResponse, NetworkError>) {
        self.previews.lock().unwrap().push_back(response);
    }

    pub fn push_upload(&self, response: Result<RawResponse, NetworkError>) {
        self.uploads.lock().unwrap().push_back(response);
    }

    pub fn push_list(&self, response: Result<RawResponse, NetworkError>) {
        self.lists.lock().unwrap().push_back(response);
    }

    pub fn push_delete(&self, response: Result<RawResponse, NetworkError>) {
        self.deletes.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| predicate(call)).count()
    }

    async fn answer(
        &self,
        call: ApiCall,
        queue: &Scripted,
        fallback: RawResponse,
    ) -> Result<RawResponse, NetworkError> {
        self.calls.lock().unwrap().push(call);
        let scripted = queue.lock().unwrap().pop_front();
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        scripted.unwrap_or(Ok(fallback))
    }
}

#[async_trait]
impl ImageApi for MockImageApi {
    async fn preview(&self, frame: &CapturedFrame) -> Result<RawResponse, NetworkError> {
        let call = ApiCall::Preview {
            file_name: frame.file_name.clone(),
            bytes: frame.bytes.len(),
        };
        self.answer(call, &self.previews, RawResponse::new(500, "no scripted preview"))
            .await
    }

    async fn upload(&self, payload: &CutoutPayload) -> Result<RawResponse, NetworkError> {
        let call = ApiCall::Upload {
            payload: payload.as_str().to_string(),
        };
        self.answer(call, &self.uploads, RawResponse::new(200, "{}")).await
    }

    async fn list_items(&self, limit: usize, offset: usize) -> Result<RawResponse, NetworkError> {
        self.answer(ApiCall::List { limit, offset }, &self.lists, RawResponse::new(200, "[]"))
            .await
    }

    async fn delete_item(&self, id: &str) -> Result<RawResponse, NetworkError> {
        let call = ApiCall::Delete { id: id.to_string() };
        self.answer(call, &self.deletes, RawResponse::new(204, "")).await
    }

    fn resolve_url(&self, path: &str) -> String {
        join_url("http://mixmatch.test", path)
    }
}
