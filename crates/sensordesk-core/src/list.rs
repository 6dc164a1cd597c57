// ── Resource list controller ──
//
// Owns the ordered collection a view displays. Exactly two primitives
// mutate it; every mutation republishes the snapshot to subscribers.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::model::{EntityId, Item};

/// Ordered, newest-first collection for one view.
///
/// Readers get cheap `Arc` snapshots; mutation goes through
/// [`push_item`](Self::push_item) and [`remove_item`](Self::remove_item) only.
#[derive(Debug)]
pub struct ListController {
    items: watch::Sender<Arc<Vec<Item>>>,
}

impl Default for ListController {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ListController {
    /// Seed with an already-fetched collection, kept in the given order.
    pub fn new(seed: Vec<Item>) -> Self {
        let (items, _) = watch::channel(Arc::new(seed));
        Self { items }
    }

    /// Insert at the front. `None` is ignored.
    ///
    /// Ids are not de-duplicated: pushing an id that is already present
    /// leaves both entries in place.
    pub fn push_item(&self, item: Option<Item>) {
        let Some(item) = item else {
            return;
        };
        debug!(id = ?item.id(), "list push");
        self.items
            .send_modify(|items| Arc::make_mut(items).insert(0, item));
    }

    /// Remove the first entry whose id loosely equals `id`
    /// (see [`EntityId::loosely_eq`]). No-op when nothing matches.
    pub fn remove_item(&self, id: &EntityId) -> Option<Item> {
        let mut removed = None;
        self.items.send_if_modified(|items| {
            let Some(pos) = position_of(items, id) else {
                return false;
            };
            removed = Some(Arc::make_mut(items).remove(pos));
            true
        });
        debug!(%id, hit = removed.is_some(), "list remove");
        removed
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<Vec<Item>> {
        self.items.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Item>>> {
        self.items.subscribe()
    }

    pub fn find(&self, id: &EntityId) -> Option<Item> {
        let items = self.items.borrow();
        position_of(&items, id).and_then(|pos| items.get(pos).cloned())
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

fn position_of(items: &[Item], id: &EntityId) -> Option<usize> {
    items
        .iter()
        .position(|item| item.id().is_some_and(|candidate| candidate.loosely_eq(id)))
}
