//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError`, `ConfigError` and rejected submissions into
//! user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sensordesk_config::ConfigError;
use sensordesk_core::{CoreError, FailureDetail, map_failure};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to server at {url}")]
    #[diagnostic(
        code(sensordesk::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             For self-signed certificates use --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(sensordesk::auth_failed),
        help(
            "Check the API token of the active profile.\n\
             Pass one with --api-token or set api_token_env in the profile."
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sensordesk::not_found),
        help("Run: sensordesk {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{action} rejected: {message}")]
    #[diagnostic(code(sensordesk::rejected), help("{fields}"))]
    Rejected {
        action: String,
        message: String,
        status: Option<u16>,
        /// One `field: message` line per rejected field.
        fields: String,
    },

    #[error("API error: {message}")]
    #[diagnostic(code(sensordesk::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    #[error("'{operation}' is not available for {resource}")]
    #[diagnostic(
        code(sensordesk::unsupported),
        help("Key lookup exists for devices and sensors only.")
    )]
    Unsupported { operation: String, resource: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sensordesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sensordesk::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(sensordesk::no_config),
        help(
            "Pass --server <URL>, set SENSORDESK_SERVER, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(sensordesk::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(sensordesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(sensordesk::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(sensordesk::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { status, .. } | Self::ApiError { status, .. } => match status {
                Some(404) => exit_code::NOT_FOUND,
                Some(409) => exit_code::CONFLICT,
                Some(401 | 403) => exit_code::AUTH,
                _ => exit_code::GENERAL,
            },
            Self::Unsupported { .. } => exit_code::PERMISSION,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Classify a failed submission.
    pub fn from_failure(action: &str, failure: &FailureDetail) -> Self {
        match failure.status {
            Some(401 | 403) => Self::AuthFailed {
                message: failure.message.clone(),
            },
            None if failure.transient => Self::ConnectionFailed {
                url: String::new(),
                source: failure.message.clone().into(),
            },
            status => Self::Rejected {
                action: action.into(),
                message: failure.message.clone(),
                status,
                fields: field_lines(failure),
            },
        }
    }
}

/// First error per field, in server order.
fn field_lines(failure: &FailureDetail) -> String {
    let errors = map_failure(failure);
    if errors.is_empty() {
        return "The server gave no field details.".into();
    }
    errors
        .iter()
        .map(|(field, e)| format!("{field}: {}", e.message().unwrap_or("invalid")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}
