// ── Confirmation gate ──
//
// Asked before a destructive operation. Answering `false` aborts that
// one invocation; nothing is retried.

use async_trait::async_trait;

use crate::model::Item;

#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, item: &Item) -> bool;
}

/// Gate with a fixed answer. Useful for `--yes` style flags and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl ConfirmationGate for FixedAnswer {
    async fn confirm(&self, _item: &Item) -> bool {
        self.0
    }
}
