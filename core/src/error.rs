//! Error types for the portal API client.
//!
//! # Design
//! Transport failures and HTTP error statuses are kept apart: a
//! `TransportError` means the round-trip never produced a response (network
//! down, blocked by CORS, timed out), while `ApiError::HttpError` carries a
//! status the server actually returned. Callers branch on
//! `is_cors_or_network` to pick the user-facing message.

use thiserror::Error;

/// Error code reported for connection-level failures.
pub const ERR_NETWORK: &str = "ERR_NETWORK";

/// Error code reported when a request exceeds its timeout.
pub const ERR_TIMEOUT: &str = "ECONNABORTED";

/// A failure to complete an HTTP round-trip.
///
/// `cors_or_network` starts out `false` and is filled in by the
/// `NetworkErrorClassifier` response stage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub code: Option<String>,
    pub cors_or_network: bool,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            cors_or_network: false,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ERR_NETWORK)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(message).with_code(ERR_TIMEOUT)
    }
}

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Whether this is a transport failure classified as CORS or network.
    pub fn is_cors_or_network(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.cors_or_network)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A token store could not be read.
#[derive(Debug, Clone, Error)]
#[error("token store unavailable: {0}")]
pub struct TokenStoreError(pub String);
