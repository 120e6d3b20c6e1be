// Gallery paging, refresh and delete against the remote collection.
//
// `loading` is the only hard concurrency rule here: while a page request is
// in flight no other page request starts, so `items` and `cursor` are only
// ever written by one completion at a time.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn, Instrument};

use super::item::{CatalogItem, ResolvedUrls};
use crate::decode::decode_item_page;
use crate::http::errors::body_prefix;
use crate::http::{ImageApi, NetworkError};
use crate::observability::create_workflow_span;
use crate::telemetry::generate_correlation_id;

pub const DEFAULT_PAGE_SIZE: usize = 60;

/// What the gallery screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    /// In server page order
    pub items: Vec<CatalogItem>,
    /// Offset of the next page
    pub cursor: usize,
    pub loading: bool,
    pub refreshing: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchOutcome {
    /// Another fetch was in flight; nothing was requested.
    Skipped,
    Loaded {
        offset: usize,
        received: usize,
        /// Fewer items than a full page came back. Informational only.
        reached_end: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ServerAck {
    /// 204
    Confirmed,
    Unconfirmed { status: u16, body_prefix: String },
    Unreachable { detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub removed_locally: bool,
    pub ack: ServerAck,
}

pub struct CatalogWorkflow {
    api: Arc<dyn ImageApi>,
    page_size: usize,
    state: Mutex<CatalogState>,
}

impl std::fmt::Debug for CatalogWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogWorkflow")
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl CatalogWorkflow {
    pub fn new(api: Arc<dyn ImageApi>, page_size: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            state: Mutex::new(CatalogState::default()),
        }
    }

    pub async fn snapshot(&self) -> CatalogState {
        self.state.lock().await.clone()
    }

    pub async fn items(&self) -> Vec<CatalogItem> {
        self.state.lock().await.items.clone()
    }

    pub fn resolve_urls(&self, item: &CatalogItem) -> ResolvedUrls {
        ResolvedUrls {
            display_url: self.api.resolve_url(&item.display_url),
            thumbnail_url: self.api.resolve_url(&item.thumbnail_url),
        }
    }

    /// First page, replacing whatever is shown once it arrives.
    pub async fn load_initial(&self) -> Result<FetchOutcome, NetworkError> {
        self.fetch_page(true).await
    }

    /// Pull-to-refresh: `load_initial` tracked under its own flag.
    pub async fn refresh(&self) -> Result<FetchOutcome, NetworkError> {
        {
            let mut state = self.state.lock().await;
            if state.refreshing {
                debug!("Refresh already running, skipping");
                return Ok(FetchOutcome::Skipped);
            }
            state.refreshing = true;
        }

        let result = self.load_initial().await;
        self.state.lock().await.refreshing = false;
        result
    }

    /// Next page (or the first, when `reset`).
    ///
    /// A no-op while another page request is in flight. On failure the
    /// current items stay and the message lands in `last_error`.
    pub async fn fetch_page(&self, reset: bool) -> Result<FetchOutcome, NetworkError> {
        let operation = if reset { "load_initial" } else { "fetch_page" };
        let span = create_workflow_span("catalog", operation, &generate_correlation_id());
        self.run_fetch(reset).instrument(span).await
    }

    async fn run_fetch(&self, reset: bool) -> Result<FetchOutcome, NetworkError> {
        let offset = {
            let mut state = self.state.lock().await;
            if state.loading {
                debug!("Page fetch already in flight, skipping");
                return Ok(FetchOutcome::Skipped);
            }
            state.loading = true;
            state.last_error = None;
            if reset {
                0
            } else {
                state.cursor
            }
        };

        let result = match self.api.list_items(self.page_size, offset).await {
            Ok(response) => response.into_success(self.api.body_prefix_len()),
            Err(e) => Err(e),
        };

        let mut state = self.state.lock().await;
        state.loading = false;

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, offset, kept = state.items.len(), "Page fetch failed");
                state.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let page = decode_item_page(&body);
        let received = page.len();

        if reset {
            state.items = page;
        } else {
            let known: HashSet<&str> = state.items.iter().map(|item| item.id.as_str()).collect();
            let repeated = page.iter().filter(|item| known.contains(item.id.as_str())).count();
            if repeated > 0 {
                warn!(repeated, offset, "Page repeats ids already shown");
            }
            state.items.extend(page);
        }
        state.cursor = offset + received;

        info!(
            offset,
            received,
            total = state.items.len(),
            cursor = state.cursor,
            reset,
            "Catalog page loaded"
        );

        Ok(FetchOutcome::Loaded {
            offset,
            received,
            reached_end: received < self.page_size,
        })
    }

    /// Delete on the server and drop the item locally whatever the server says.
    pub async fn delete(&self, id: &str) -> DeleteOutcome {
        let span = create_workflow_span("catalog", "delete", &generate_correlation_id());
        self.run_delete(id).instrument(span).await
    }

    async fn run_delete(&self, id: &str) -> DeleteOutcome {
        let ack = match self.api.delete_item(id).await {
            Ok(response) if response.status == 204 => ServerAck::Confirmed,
            Ok(response) => {
                let prefix = body_prefix(&response.body, self.api.body_prefix_len());
                warn!(id, status = response.status, body = %prefix, "Delete not confirmed by server");
                ServerAck::Unconfirmed {
                    status: response.status,
                    body_prefix: prefix,
                }
            }
            Err(e) => {
                warn!(id, error = %e, "Delete request failed");
                ServerAck::Unreachable {
                    detail: e.to_string(),
                }
            }
        };

        let mut state = self.state.lock().await;
        let removed_locally = match state.items.iter().position(|item| item.id == id) {
            Some(index) => {
                state.items.remove(index);
                true
            }
            None => false,
        };
        info!(id, removed_locally, ack = ?ack, "Catalog item deleted");

        DeleteOutcome {
            removed_locally,
            ack,
        }
    }
}
