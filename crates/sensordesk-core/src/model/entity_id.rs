// ── Resource identity ──
//
// The server hands out numeric ids, but ids also arrive as strings from
// command-line arguments and form fields. `EntityId` carries both and
// defines the loose comparison used to match them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ── EntityId ────────────────────────────────────────────────────────

/// Identifier of a resource record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    /// Read an id out of a JSON value. Only numbers and strings qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(
                n.as_i64()
                    .or_else(|| n.as_f64().and_then(integral))
                    .map_or_else(|| Self::Text(n.to_string()), Self::Number),
            ),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Coercing comparison: `7 ~ "7"` and `7 ~ " 7 "` match, `"7" ~ "07"`
    /// does not (text vs text is exact). Empty text never matches a number.
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(n), Self::Text(s)) | (Self::Text(s), Self::Number(n)) => {
                text_as_number(s).is_some_and(|parsed| parsed == *n)
            }
        }
    }

    /// Path segment for this id (`devices/{id}`).
    pub fn as_path_segment(&self) -> String {
        self.to_string()
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.clone()),
        }
    }
}

fn text_as_number(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    // "7.0" still names id 7.
    integral(trimmed.parse::<f64>().ok()?)
}

/// `f` as an `i64` when it has no fractional part.
fn integral(f: f64) -> Option<i64> {
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    let n = f as i64;
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let exact = (n as f64 - f).abs() < f64::EPSILON;
    exact.then_some(n)
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    /// Purely numeric input becomes `Number`, anything else `Text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Number))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}
