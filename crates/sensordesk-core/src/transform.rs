// ── Field transforms ──
//
// Per-field rewrites applied on the way out (before a request body is sent)
// and on the way in (before a result lands in a list). Fields that are
// absent or already in the target shape pass through untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Number, Value};

use crate::model::Item;

pub type FieldTransform = Arc<dyn Fn(Item) -> Item + Send + Sync>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Leaves the item as it is.
pub fn identity() -> FieldTransform {
    Arc::new(|item| item)
}

/// Parse display-formatted numbers (`"1,234.5"`, `" 42 "`) back into JSON
/// numbers. Strings that do not parse are left as text so the server can
/// reject them with a field error.
pub fn normalize_numbers(fields: &[&str]) -> FieldTransform {
    let fields = owned(fields);
    Arc::new(move |mut item| {
        for field in &fields {
            let parsed = item.get_str(field).and_then(parse_number);
            if let Some(number) = parsed {
                item.set(field.as_str(), Value::Number(number));
            }
        }
        item
    })
}

/// Render epoch-millisecond fields as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_timestamps(fields: &[&str]) -> FieldTransform {
    let fields = owned(fields);
    Arc::new(move |mut item| {
        for field in &fields {
            let formatted = item.get(field).and_then(Value::as_i64).and_then(format_millis);
            if let Some(text) = formatted {
                item.set(field.as_str(), text);
            }
        }
        item
    })
}

/// Apply `transforms` left to right.
pub fn chain(transforms: Vec<FieldTransform>) -> FieldTransform {
    Arc::new(move |item| transforms.iter().fold(item, |acc, t| t(acc)))
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_owned()).collect()
}

fn parse_number(raw: &str) -> Option<Number> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(int) = cleaned.parse::<i64>() {
        return Some(Number::from(int));
    }
    cleaned.parse::<f64>().ok().and_then(Number::from_f64)
}

fn format_millis(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}
