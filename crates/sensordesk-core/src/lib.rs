// sensordesk-core: Resource synchronization between the REST API and views
// (forms, lists, confirmation, notifications).

pub mod compose;
pub mod config;
pub mod confirm;
pub mod console;
pub mod delete;
pub mod error;
pub mod form;
pub mod gateway;
pub mod list;
pub mod model;
pub mod notify;
pub mod transform;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use compose::{ResourceBinding, ResourceBindingBuilder};
pub use config::{ConsoleConfig, TlsVerification};
pub use confirm::{ConfirmationGate, FixedAnswer};
pub use console::Console;
pub use delete::DeleteController;
pub use error::CoreError;
pub use form::{FormController, FormPhase, FormState, Reservation, Settled, Submission};
pub use gateway::{FailureDetail, Gateway, Outcome, RestGateway};
pub use list::ListController;
pub use model::{EntityId, Item, ResourceKind};
pub use notify::{NotificationKind, Notifier, TracingNotifier};
pub use transform::FieldTransform;
pub use validation::{FieldErrorMap, map_failure};

pub use sensordesk_api::ErrorDescriptor;
