use thiserror::Error;

use crate::types::ErrorDescriptor;

/// Top-level error type for the `sensordesk-api` crate.
///
/// Covers every failure mode of a single request/response round trip:
/// transport, authentication, structured validation rejections, and
/// response bodies that don't match the expected shape.
/// `sensordesk-core` folds these into form-level failure state.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The server refused the request credentials (HTTP 401/403).
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// API token could not be turned into a header value.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server rejections ───────────────────────────────────────────
    /// The server rejected specific fields (`{ "errors": [{ "property": .. }] }`).
    #[error("Validation failed (HTTP {status}): {} field error(s)", .errors.len())]
    Validation {
        status: u16,
        errors: Vec<ErrorDescriptor>,
    },

    /// Any other non-success status without field-level structure.
    #[error("Request failed (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// Body parsed, but not into the shape the caller needs
    /// (e.g. an array where a JSON object was expected).
    #[error("Unexpected response shape: expected {expected}, got {preview}")]
    UnexpectedShape {
        expected: &'static str,
        preview: String,
    },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code associated with the failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. }
            | Self::Validation { status, .. }
            | Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field-level descriptors, if the server sent any.
    pub fn field_errors(&self) -> &[ErrorDescriptor] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }
}
