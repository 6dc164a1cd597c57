// ── Delete form controller ──
//
// A `FormController` pointed at the delete endpoint, with an optional
// confirmation step in front of it.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::confirm::ConfirmationGate;
use crate::form::{FormController, Submission};

pub const DELETE_SUCCESS_MESSAGE: &str = "Deleted successfully!";

pub struct DeleteController {
    form: FormController,
    gate: Option<Arc<dyn ConfirmationGate>>,
}

impl fmt::Debug for DeleteController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeleteController")
            .field("form", &self.form)
            .field("gated", &self.gate.is_some())
            .finish()
    }
}

impl DeleteController {
    /// Wrap a form whose action issues the delete. The success message is
    /// replaced with the delete-specific one.
    pub fn new(form: FormController, gate: Option<Arc<dyn ConfirmationGate>>) -> Self {
        Self {
            form: form.with_success_message(DELETE_SUCCESS_MESSAGE),
            gate,
        }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub fn is_gated(&self) -> bool {
        self.gate.is_some()
    }

    /// Confirm (if a gate is configured), then delete the working item.
    ///
    /// The form is reserved before the gate is asked, so the item shown for
    /// confirmation is the one deleted and edits wait until it settles. A
    /// `false` answer returns `Declined` with no request, no state change
    /// and no notification.
    pub async fn delete_item(&self) -> Submission {
        let Some(reservation) = self.form.reserve() else {
            return Submission::Busy;
        };

        if let Some(gate) = &self.gate {
            if !gate.confirm(reservation.item()).await {
                let id = reservation.item().id();
                debug!(form = %self.form.label(), ?id, "delete declined");
                return Submission::Declined;
            }
        }

        reservation.submit().await
    }
}
