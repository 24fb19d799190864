//! Adapter error taxonomy.
//!
//! Adapters distinguish "found nothing" (`Ok(None)`) from actual failures.
//! Failures carry enough shape for the retry policy to decide whether a
//! status code is transient; everything else passes through untouched and
//! is downgraded to "absent" at the aggregator stage boundary.

use thiserror::Error;

/// Errors produced by source adapters while talking to an upstream.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    /// Connection, TLS, or timeout failure before a status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered 2xx but the body did not match the expected
    /// schema. Treated as absent by the caller (fail closed).
    #[error("malformed upstream response: {0}")]
    Decode(String),
}

impl AdapterError {
    /// Build from a reqwest error, preserving the status when one exists.
    pub fn from_http(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AdapterError::Status {
                status: status.as_u16(),
            },
            None => AdapterError::Transport(err.to_string()),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdapterError::Status { status } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure is retryable under the given transient set.
    ///
    /// Only declared status codes are transient; transport and decode
    /// failures are permanent by design.
    pub fn is_transient(&self, transient_statuses: &[u16]) -> bool {
        self.status()
            .map(|s| transient_statuses.contains(&s))
            .unwrap_or(false)
    }
}
