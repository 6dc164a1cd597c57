// ── Validation error mapping ──
//
// Turns a gateway failure into per-field error state for a form.

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Serialize;

use sensordesk_api::ErrorDescriptor;

use crate::gateway::FailureDetail;

/// Field name → the error to show next to that field.
///
/// Keeps server order. Property names the form doesn't know are kept too;
/// the view decides what to render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrorMap(IndexMap<String, ErrorDescriptor>);

impl FieldErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&ErrorDescriptor> {
        self.0.get(field)
    }

    /// Message for a field, if the descriptor carries one.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(ErrorDescriptor::message)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ErrorDescriptor)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Insert unless the field already has an error. Returns `false` when
    /// the descriptor was discarded.
    fn insert_first(&mut self, descriptor: ErrorDescriptor) -> bool {
        match self.0.entry(descriptor.property.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(descriptor);
                true
            }
        }
    }
}

impl FromIterator<ErrorDescriptor> for FieldErrorMap {
    /// First descriptor per property wins.
    fn from_iter<I: IntoIterator<Item = ErrorDescriptor>>(iter: I) -> Self {
        let mut map = Self::new();
        for descriptor in iter {
            map.insert_first(descriptor);
        }
        map
    }
}

/// Build the field error map for a failed submission.
///
/// Empty when the failure has no field-scoped errors; the caller still
/// holds `detail` and reports its message as a generic error.
pub fn map_failure(detail: &FailureDetail) -> FieldErrorMap {
    detail.errors.iter().cloned().collect()
}
