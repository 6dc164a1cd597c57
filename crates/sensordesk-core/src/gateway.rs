// ── Request gateway ──
//
// The single seam between the synchronization core and the network.
// Every round trip resolves to an `Outcome`; transport errors never
// escape as `Err`, they become a classified `FailureDetail`.

use async_trait::async_trait;
use tracing::debug;

use sensordesk_api::{ErrorDescriptor, RestClient};

use crate::model::Item;

// ── Outcome ─────────────────────────────────────────────────────────

/// Result of one request: the server's record, or why there isn't one.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Item),
    Failure(FailureDetail),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Normalized failure context handed to the validation mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureDetail {
    /// HTTP status, if a response was received at all.
    pub status: Option<u16>,
    /// Human-readable summary for a generic error notification.
    pub message: String,
    /// Field-scoped descriptors, untouched and in server order.
    pub errors: Vec<ErrorDescriptor>,
    /// Network-level failure (connect, timeout, 5xx).
    pub transient: bool,
}

impl FailureDetail {
    /// Failure without any field structure.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            errors: Vec::new(),
            transient: false,
        }
    }

    /// Failure carrying field-scoped descriptors.
    pub fn validation(status: u16, errors: Vec<ErrorDescriptor>) -> Self {
        Self {
            status: Some(status),
            message: format!("{} field(s) rejected", errors.len()),
            errors,
            transient: false,
        }
    }

    pub fn has_field_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl From<sensordesk_api::Error> for FailureDetail {
    fn from(err: sensordesk_api::Error) -> Self {
        let status = err.status();
        let transient = err.is_transient();
        match err {
            sensordesk_api::Error::Validation { status, errors } => Self::validation(status, errors),
            other => Self {
                status,
                message: other.to_string(),
                errors: Vec::new(),
                transient,
            },
        }
    }
}

// ── Gateway trait ───────────────────────────────────────────────────

/// Issues REST calls on behalf of form controllers and seeds lists.
///
/// Paths are relative to the API base (`"devices/7"`).
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn get(&self, path: &str) -> Outcome;

    async fn post(&self, path: &str, body: &Item) -> Outcome;

    async fn put(&self, path: &str, body: &Item) -> Outcome;

    async fn delete(&self, path: &str) -> Outcome;

    /// Fetch a whole collection, used to seed list controllers.
    async fn fetch_collection(&self, path: &str, rel: &str) -> Result<Vec<Item>, FailureDetail>;
}

// ── RestGateway ─────────────────────────────────────────────────────

/// `Gateway` over the HTTP `RestClient`.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: RestClient,
}

impl RestGateway {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }
}

fn settle(result: Result<sensordesk_api::JsonObject, sensordesk_api::Error>) -> Outcome {
    match result {
        Ok(body) => Outcome::Success(Item::from(body)),
        Err(e) => {
            debug!(error = %e, "request failed");
            Outcome::Failure(FailureDetail::from(e))
        }
    }
}

#[async_trait]
impl Gateway for RestGateway {
    async fn get(&self, path: &str) -> Outcome {
        settle(self.client.get(path).await)
    }

    async fn post(&self, path: &str, body: &Item) -> Outcome {
        settle(self.client.post(path, body.as_object()).await)
    }

    async fn put(&self, path: &str, body: &Item) -> Outcome {
        settle(self.client.put(path, body.as_object()).await)
    }

    async fn delete(&self, path: &str) -> Outcome {
        settle(self.client.delete(path).await)
    }

    async fn fetch_collection(&self, path: &str, rel: &str) -> Result<Vec<Item>, FailureDetail> {
        let entries = self.client.list(path, rel).await?;
        Ok(entries.into_iter().map(Item::from).collect())
    }
}
