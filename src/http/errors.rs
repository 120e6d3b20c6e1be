use thiserror::Error;

/// Number of body characters carried into error messages by default.
pub const DEFAULT_BODY_PREFIX_LEN: usize = 120;

/// Failure talking to the MixMatch server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request never produced a response (DNS, connect, broken body).
    #[error("request to {endpoint} failed: {detail}")]
    Transport { endpoint: String, detail: String },

    /// No response within the configured request timeout.
    #[error("request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {body_prefix}")]
    Status { status: u16, body_prefix: String },
}

impl NetworkError {
    pub fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        NetworkError::Transport {
            endpoint: endpoint.to_string(),
            detail: err.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::Status { status, .. } => Some(*status),
            NetworkError::Transport { .. } | NetworkError::Timeout { .. } => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetworkError::Timeout { .. })
    }
}

/// First `max_chars` characters of a body, on a char boundary.
pub fn body_prefix(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}
