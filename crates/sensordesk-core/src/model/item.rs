// ── Item ──
//
// A resource record as displayed in lists and edited in forms. The core
// only relies on `id`; every other attribute passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sensordesk_api::JsonObject;

use super::EntityId;

/// Opaque resource record backed by a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(JsonObject);

impl Item {
    /// The empty object a form resets to after a successful submit.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The record's identifier, if it has a usable `id` field.
    pub fn id(&self) -> Option<EntityId> {
        self.0.get("id").and_then(EntityId::from_value)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field as a string slice, when it is a JSON string.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style `set`.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Iterate attributes in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    pub fn into_object(self) -> JsonObject {
        self.0
    }
}

impl From<JsonObject> for Item {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Item {
    type Error = Value;

    /// Only JSON objects are items; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
