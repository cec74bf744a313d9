//! Storage tier identifiers and error definitions.

use serde::Serialize;
use thiserror::Error;

/// Which storage tier is active or served a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Cross-process backend reached over the network.
    Durable,
    /// Private state inside this process.
    InProcess,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Durable => "durable",
            BackendKind::InProcess => "in-process",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a durable backend.
///
/// These never leave the store: the tiered store converts every one of them
/// into a fallback to the in-process tier.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The server closed the connection mid-reply.
    #[error("connection closed by server")]
    Closed,

    /// The server replied with something we cannot parse.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server replied with an error message.
    #[error("server error: {0}")]
    Server(String),

    /// The backend URL is malformed or uses an unsupported scheme.
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The operation did not finish within its deadline.
    #[error("timed out after {0} ms")]
    Timeout(u64),
}

/// Result type for durable backend operations.
pub type StoreResult<T> = Result<T, StoreError>;
