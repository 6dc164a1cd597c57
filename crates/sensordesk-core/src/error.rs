// ── Core error types ──
//
// Errors raised while *building* the console (bad URL, TLS material,
// configuration). Request failures never surface here: they become
// form state through `FailureDetail`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot reach server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sensordesk_api::Error> for CoreError {
    fn from(err: sensordesk_api::Error) -> Self {
        match err {
            sensordesk_api::Error::Authentication { message, .. } => {
                CoreError::AuthenticationFailed { message }
            }
            sensordesk_api::Error::InvalidToken(reason) => CoreError::Config {
                message: format!("Invalid API token: {reason}"),
            },
            sensordesk_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            sensordesk_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            sensordesk_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::ConnectionFailed {
                    url: e.url().map(ToString::to_string).unwrap_or_default(),
                    reason: e.to_string(),
                }
            }
            sensordesk_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            other => CoreError::Api {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

impl From<crate::gateway::FailureDetail> for CoreError {
    fn from(detail: crate::gateway::FailureDetail) -> Self {
        CoreError::Api {
            message: detail.message,
            status: detail.status,
        }
    }
}
