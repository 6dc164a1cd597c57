// ── Notifications ──
//
// Fire-and-forget user feedback after a submission settles. The console
// renders these however it likes; the core only emits them.

use serde::Serialize;
use strum::Display;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Receives success/error messages from form controllers.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Default notifier: routes messages into the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => info!(%kind, "{message}"),
            NotificationKind::Error => warn!(%kind, "{message}"),
        }
    }
}
