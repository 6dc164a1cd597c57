// ── Runtime connection configuration ──
//
// Describes *how* to reach the REST API and how the console behaves.
// Never touches disk: the CLI builds a `ConsoleConfig` from its profile
// and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use sensordesk_api::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Configuration for one console session against one API.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API base (e.g. `https://console.local/api/`).
    pub base_url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional bearer token.
    pub api_token: Option<SecretString>,
    /// Ask before every delete.
    pub confirm_deletes: bool,
    /// Added to the `key` field of key-lookup results.
    pub key_offset: i64,
}

impl ConsoleConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            api_token: None,
            confirm_deletes: true,
            key_offset: 0,
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            api_token: self.api_token.clone(),
        }
    }
}
