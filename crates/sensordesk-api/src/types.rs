// Wire types for the REST API.
//
// Resources are plain JSON objects; the API never commits to a schema
// beyond the `id` field. Validation rejections and collection listings
// have fixed shapes, modelled here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A resource record as sent over the wire.
pub type JsonObject = serde_json::Map<String, Value>;

// ── Validation errors ────────────────────────────────────────────────

/// One per-field rejection from the server.
///
/// Only `property` is required; everything else (`message`, `msg`,
/// `code`, `invalidValue`, ...) is preserved untouched in `detail`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub property: String,
    #[serde(flatten)]
    pub detail: JsonObject,
}

impl ErrorDescriptor {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            detail: JsonObject::new(),
        }
    }

    /// Attach an extra attribute (builder-style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }

    /// Human-readable message: `message`, falling back to `msg`.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .get("message")
            .or_else(|| self.detail.get("msg"))
            .and_then(Value::as_str)
    }

    /// Machine-readable code, if the server sent one.
    pub fn code(&self) -> Option<&str> {
        self.detail.get("code").and_then(Value::as_str)
    }
}

/// Failure body carrying field-scoped errors.
#[derive(Debug, Deserialize)]
pub(crate) struct ValidationBody {
    pub errors: Vec<ErrorDescriptor>,
}

/// Failure body without field structure (`{ "message": .. }` or `{ "error": .. }`).
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Collections ──────────────────────────────────────────────────────

/// HAL-style collection envelope: `{ "_embedded": { "<rel>": [..] } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct Collection {
    #[serde(rename = "_embedded", default)]
    pub embedded: serde_json::Map<String, Value>,
}
