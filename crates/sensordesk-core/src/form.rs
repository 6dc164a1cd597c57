// ── Resource form controller ──
//
// Drives one create/update (or delete, via `DeleteController`) form through
// Idle → Submitting → Succeeded|Failed → Idle. State lives in a `watch`
// channel so views re-render on every transition; the Submitting guard is
// an atomic check-and-set on that channel, never held across an await.

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::gateway::{FailureDetail, Outcome};
use crate::model::Item;
use crate::notify::{NotificationKind, Notifier};
use crate::validation::{FieldErrorMap, map_failure};

/// Performs the request for a submission. Receives a copy of the working item.
pub type Action = Arc<dyn Fn(Item) -> BoxFuture<'static, Outcome> + Send + Sync>;

/// Post-processes a successful payload before it lands in `result`.
pub type ResultMap = Arc<dyn Fn(Item) -> Item + Send + Sync>;

/// Runs after every settlement, once form state is final.
pub type SettleHook = Box<dyn Fn(&Settled) + Send + Sync>;

const DEFAULT_SUCCESS_MESSAGE: &str = "Saved successfully!";

// ── State ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Everything a view needs to render the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Working copy being edited. Distinct from any list entry.
    pub item: Item,
    /// Error slot of the working item: one entry per rejected field.
    pub errors: FieldErrorMap,
    /// Last successful payload.
    pub result: Option<Item>,
    /// Last success message.
    pub message: Option<String>,
    /// Raw failure of the last submission, kept even when `errors` is empty.
    pub failure: Option<FailureDetail>,
    pub phase: FormPhase,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    Succeeded {
        /// The working item as it was sent.
        submitted: Item,
        result: Item,
    },
    Failed {
        submitted: Item,
        errors: FieldErrorMap,
        failure: FailureDetail,
    },
}

impl Settled {
    pub fn submitted(&self) -> &Item {
        match self {
            Self::Succeeded { submitted, .. } | Self::Failed { submitted, .. } => submitted,
        }
    }
}

/// Return value of `submit()` / `delete_item()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Settled(Settled),
    /// Another submission on this controller is still in flight.
    Busy,
    /// The confirmation gate said no. Nothing was sent.
    Declined,
}

impl Submission {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Settled(Settled::Succeeded { .. }))
    }
}

// ── Reservation ─────────────────────────────────────────────────────

/// Exclusive claim on a form, from `reserve()` until settlement.
///
/// The snapshot taken at reservation is exactly what gets sent. Dropping
/// an unsettled reservation (declined, timed out, aborted) puts the form
/// back in the phase it was claimed from and leaves everything else as is.
pub struct Reservation<'a> {
    form: &'a FormController,
    item: Item,
    prior: FormPhase,
    settled: bool,
}

impl Reservation<'_> {
    /// The working item as it will be sent.
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Run the action on the reserved snapshot.
    pub async fn submit(self) -> Submission {
        let form = self.form;
        form.run(self).await
    }
}

impl fmt::Debug for Reservation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservation")
            .field("form", &self.form.label)
            .field("item", &self.item)
            .field("settled", &self.settled)
            .finish_non_exhaustive()
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let prior = self.prior;
        self.form.state.send_modify(|st| st.phase = prior);
        debug!(form = %self.form.label, "reservation released unsettled");
    }
}

// ── FormController ──────────────────────────────────────────────────

pub struct FormController {
    label: String,
    action: Action,
    notifier: Arc<dyn Notifier>,
    success_message: String,
    clear_on_success: bool,
    map_result: Option<ResultMap>,
    hooks: Vec<SettleHook>,
    state: watch::Sender<FormState>,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("label", &self.label)
            .field("success_message", &self.success_message)
            .field("clear_on_success", &self.clear_on_success)
            .field("hooks", &self.hooks.len())
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl FormController {
    /// `label` names the form in logs and failure notifications
    /// (e.g. `"Create device"`).
    pub fn new(label: impl Into<String>, action: Action, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(FormState::default());
        Self {
            label: label.into(),
            action,
            notifier,
            success_message: DEFAULT_SUCCESS_MESSAGE.into(),
            clear_on_success: true,
            map_result: None,
            hooks: Vec::new(),
            state,
        }
    }

    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    /// Keep the working item after success instead of clearing the form.
    pub fn keep_item_on_success(mut self) -> Self {
        self.clear_on_success = false;
        self
    }

    pub fn with_result_map(mut self, map: ResultMap) -> Self {
        self.map_result = Some(map);
        self
    }

    /// Register a continuation run after every settlement.
    pub fn on_settled(&mut self, hook: SettleHook) {
        self.hooks.push(hook);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    pub fn item(&self) -> Item {
        self.state.borrow().item.clone()
    }

    pub fn errors(&self) -> FieldErrorMap {
        self.state.borrow().errors.clone()
    }

    pub fn result(&self) -> Option<Item> {
        self.state.borrow().result.clone()
    }

    pub fn phase(&self) -> FormPhase {
        self.state.borrow().phase
    }

    pub fn is_submitting(&self) -> bool {
        self.phase() == FormPhase::Submitting
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Replace the working item. Refused while a submission is in flight.
    pub fn set_item(&self, item: Item) -> bool {
        self.edit(|current| *current = item)
    }

    /// Set one field on the working item. Refused while submitting.
    pub fn set_field(&self, field: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.edit(|current| current.set(field, value))
    }

    fn edit(&self, apply: impl FnOnce(&mut Item)) -> bool {
        self.state.send_if_modified(|st| {
            if st.phase == FormPhase::Submitting {
                return false;
            }
            apply(&mut st.item);
            true
        })
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Send the working item through the action.
    ///
    /// Returns `Busy` without touching state if a submission is already
    /// in flight on this controller.
    pub async fn submit(&self) -> Submission {
        let Some(reservation) = self.reserve() else {
            warn!(form = %self.label, "submission already in flight, ignoring");
            return Submission::Busy;
        };
        reservation.submit().await
    }

    /// Claim the form: Idle → Submitting, snapshotting the working item.
    ///
    /// Edits are refused until the reservation is submitted or dropped.
    /// Returns `None` if already submitting.
    pub fn reserve(&self) -> Option<Reservation<'_>> {
        let mut claimed = None;
        self.state.send_if_modified(|st| {
            if st.phase == FormPhase::Submitting {
                return false;
            }
            claimed = Some((st.item.clone(), st.phase));
            st.phase = FormPhase::Submitting;
            true
        });
        let (item, prior) = claimed?;
        debug!(form = %self.label, "reserved");
        Some(Reservation {
            form: self,
            item,
            prior,
            settled: false,
        })
    }

    async fn run(&self, mut reservation: Reservation<'_>) -> Submission {
        self.state.send_modify(|st| {
            st.errors.clear();
            st.failure = None;
        });
        debug!(form = %self.label, "submitting");

        let submitted = reservation.item.clone();
        let outcome = (self.action)(submitted.clone()).await;
        let settled = match outcome {
            Outcome::Success(result) => self.succeed(submitted, result),
            Outcome::Failure(failure) => self.fail(submitted, failure),
        };

        for hook in &self.hooks {
            hook(&settled);
        }
        reservation.settled = true;
        self.state.send_modify(|st| st.phase = FormPhase::Idle);

        Submission::Settled(settled)
    }

    fn succeed(&self, submitted: Item, result: Item) -> Settled {
        let result = match &self.map_result {
            Some(map) => map(result),
            None => result,
        };

        self.state.send_modify(|st| {
            st.result = Some(result.clone());
            st.message = Some(self.success_message.clone());
            if self.clear_on_success {
                st.item = Item::empty();
            }
            st.phase = FormPhase::Succeeded;
        });
        info!(form = %self.label, id = ?result.id(), "submission succeeded");
        self.notifier
            .notify(&self.success_message, NotificationKind::Success);

        Settled::Succeeded { submitted, result }
    }

    fn fail(&self, submitted: Item, failure: FailureDetail) -> Settled {
        let errors = map_failure(&failure);

        self.state.send_modify(|st| {
            st.errors = errors.clone();
            st.failure = Some(failure.clone());
            st.phase = FormPhase::Failed;
        });
        warn!(
            form = %self.label,
            status = ?failure.status,
            fields = errors.len(),
            "submission failed: {}", failure.message
        );
        self.notifier.notify(
            &format!("{} failed: {}", self.label, failure.message),
            NotificationKind::Error,
        );

        Settled::Failed {
            submitted,
            errors,
            failure,
        }
    }
}
