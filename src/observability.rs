use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// MixMatch API usage counters, one set per client.
#[derive(Debug, Default)]
pub struct ApiMetrics {
    pub total_requests: AtomicU64,
    pub transport_errors: AtomicU64,
    pub error_statuses: AtomicU64,
    pub decode_fallbacks: AtomicU64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_error(&self) {
        self.transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_status(&self, status: u16) {
        if !(200..300).contains(&status) {
            self.error_statuses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A payload was only recovered by a strategy after the first.
    pub fn record_decode_fallback(&self) {
        self.decode_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> ApiStats {
        ApiStats {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            transport_errors: self.transport_errors.load(Ordering::Relaxed),
            error_statuses: self.error_statuses.load(Ordering::Relaxed),
            decode_fallbacks: self.decode_fallbacks.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            requests = stats.total_requests,
            transport_errors = stats.transport_errors,
            error_statuses = stats.error_statuses,
            decode_fallbacks = stats.decode_fallbacks,
            "MixMatch API metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiStats {
    pub total_requests: u64,
    pub transport_errors: u64,
    pub error_statuses: u64,
    pub decode_fallbacks: u64,
}

/// Span wrapping one user-initiated workflow operation.
pub fn create_workflow_span(workflow: &str, operation: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow",
        workflow.name = workflow,
        workflow.operation = operation,
        correlation.id = correlation_id,
    )
}

/// Logs how long a request took when finished.
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self, status: Option<u16>) {
        let duration = self.start.elapsed();
        debug!(
            operation = %self.operation,
            status = ?status,
            duration_ms = duration.as_millis() as u64,
            "Request completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_non_success_statuses_count_as_errors() {
        let metrics = ApiMetrics::new();
        metrics.record_request();
        metrics.record_status(200);
        metrics.record_request();
        metrics.record_status(204);
        metrics.record_request();
        metrics.record_status(500);

        let stats = metrics.get_stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.error_statuses, 1);
        assert_eq!(stats.transport_errors, 0);
    }

    #[test]
    fn test_decode_fallbacks_accumulate() {
        let metrics = ApiMetrics::new();
        metrics.record_decode_fallback();
        metrics.record_decode_fallback();
        assert_eq!(metrics.get_stats().decode_fallbacks, 2);
    }
}
