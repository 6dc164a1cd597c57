// ── Resource composition ──
//
// Wires one resource kind together: a seeded list, the create/update/delete
// forms, and (for devices and sensors) the key-lookup form. Forms and list
// never call each other; settle hooks registered here are the only path
// from a finished submission to a list mutation.

use std::fmt;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use crate::confirm::ConfirmationGate;
use crate::delete::DeleteController;
use crate::form::{Action, FormController, ResultMap, Settled, SettleHook};
use crate::gateway::{FailureDetail, Gateway, Outcome};
use crate::list::ListController;
use crate::model::{EntityId, Item, ResourceKind};
use crate::notify::Notifier;
use crate::transform::{self, FieldTransform};

pub const CREATE_SUCCESS_MESSAGE: &str = "Created successfully!";
pub const UPDATE_SUCCESS_MESSAGE: &str = "Updated successfully!";
pub const KEY_SUCCESS_MESSAGE: &str = "Key retrieved!";

// ── ResourceBinding ─────────────────────────────────────────────────

/// Everything a view of one resource kind works with.
///
/// Controllers are `Arc`s so callers can drive them from spawned tasks.
/// The list is owned here; hooks only hold a `Weak`, so once the binding
/// is dropped, submissions that settle late leave nothing behind.
pub struct ResourceBinding {
    kind: ResourceKind,
    list: Arc<ListController>,
    create: Arc<FormController>,
    update: Arc<FormController>,
    delete: Arc<DeleteController>,
    key: Option<Arc<FormController>>,
}

impl fmt::Debug for ResourceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceBinding")
            .field("kind", &self.kind)
            .field("items", &self.list.len())
            .field("key_lookup", &self.key.is_some())
            .finish_non_exhaustive()
    }
}

impl ResourceBinding {
    pub fn builder(
        kind: ResourceKind,
        gateway: Arc<dyn Gateway>,
        notifier: Arc<dyn Notifier>,
    ) -> ResourceBindingBuilder {
        ResourceBindingBuilder {
            kind,
            gateway,
            notifier,
            seed: Vec::new(),
            gate: None,
            outbound: transform::identity(),
            display: transform::identity(),
            key_offset: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn list(&self) -> &Arc<ListController> {
        &self.list
    }

    pub fn create(&self) -> &Arc<FormController> {
        &self.create
    }

    pub fn update(&self) -> &Arc<FormController> {
        &self.update
    }

    pub fn delete(&self) -> &Arc<DeleteController> {
        &self.delete
    }

    /// Key-lookup form, present for kinds that expose `{id}/key`.
    pub fn key(&self) -> Option<&Arc<FormController>> {
        self.key.as_ref()
    }
}

// ── Builder ─────────────────────────────────────────────────────────

pub struct ResourceBindingBuilder {
    kind: ResourceKind,
    gateway: Arc<dyn Gateway>,
    notifier: Arc<dyn Notifier>,
    seed: Vec<Item>,
    gate: Option<Arc<dyn ConfirmationGate>>,
    outbound: FieldTransform,
    display: FieldTransform,
    key_offset: i64,
}

impl ResourceBindingBuilder {
    /// Initial list contents, newest first.
    pub fn seed(mut self, items: Vec<Item>) -> Self {
        self.seed = items;
        self
    }

    /// Ask this gate before every delete.
    pub fn confirm_with(mut self, gate: Arc<dyn ConfirmationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Applied to request bodies of create and update.
    pub fn outbound(mut self, transform: FieldTransform) -> Self {
        self.outbound = transform;
        self
    }

    /// Applied to items before they enter the list (seed included).
    pub fn display(mut self, transform: FieldTransform) -> Self {
        self.display = transform;
        self
    }

    /// Added to the `key` field of key-lookup results.
    pub fn key_offset(mut self, offset: i64) -> Self {
        self.key_offset = offset;
        self
    }

    pub fn build(self) -> ResourceBinding {
        let Self {
            kind,
            gateway,
            notifier,
            seed,
            gate,
            outbound,
            display,
            key_offset,
        } = self;

        let seed = seed.into_iter().map(&*display).collect();
        let list = Arc::new(ListController::new(seed));
        let noun = kind.label().to_lowercase();

        let mut create = FormController::new(
            format!("Create {noun}"),
            create_action(gateway.clone(), kind, outbound.clone()),
            notifier.clone(),
        )
        .with_success_message(CREATE_SUCCESS_MESSAGE);
        create.on_settled(publish_created(Arc::downgrade(&list), display.clone()));

        let mut update = FormController::new(
            format!("Update {noun}"),
            update_action(gateway.clone(), kind, outbound),
            notifier.clone(),
        )
        .with_success_message(UPDATE_SUCCESS_MESSAGE);
        update.on_settled(publish_updated(Arc::downgrade(&list), display));

        let mut delete = DeleteController::new(
            FormController::new(
                format!("Delete {noun}"),
                delete_action(gateway.clone(), kind),
                notifier.clone(),
            ),
            gate,
        );
        delete
            .form_mut()
            .on_settled(publish_deleted(Arc::downgrade(&list)));

        let key = kind.supports_key_lookup().then(|| {
            Arc::new(
                FormController::new(
                    format!("Fetch {noun} key"),
                    key_action(gateway, kind),
                    notifier,
                )
                .with_success_message(KEY_SUCCESS_MESSAGE)
                .keep_item_on_success()
                .with_result_map(offset_key(key_offset)),
            )
        });

        debug!(%kind, seeded = list.len(), "resource binding ready");

        ResourceBinding {
            kind,
            list,
            create: Arc::new(create),
            update: Arc::new(update),
            delete: Arc::new(delete),
            key,
        }
    }
}

// ── Actions ─────────────────────────────────────────────────────────

fn create_action(gateway: Arc<dyn Gateway>, kind: ResourceKind, outbound: FieldTransform) -> Action {
    Arc::new(move |item| {
        let gateway = gateway.clone();
        let body = outbound(item);
        async move { gateway.post(kind.path(), &body).await }.boxed()
    })
}

fn update_action(gateway: Arc<dyn Gateway>, kind: ResourceKind, outbound: FieldTransform) -> Action {
    Arc::new(move |item| {
        let Some(id) = item.id() else {
            return missing_id(kind);
        };
        let gateway = gateway.clone();
        let path = member_path(kind, &id);
        let body = outbound(item);
        async move { gateway.put(&path, &body).await }.boxed()
    })
}

fn delete_action(gateway: Arc<dyn Gateway>, kind: ResourceKind) -> Action {
    Arc::new(move |item| {
        let Some(id) = item.id() else {
            return missing_id(kind);
        };
        let gateway = gateway.clone();
        let path = member_path(kind, &id);
        async move { gateway.delete(&path).await }.boxed()
    })
}

fn key_action(gateway: Arc<dyn Gateway>, kind: ResourceKind) -> Action {
    Arc::new(move |item| {
        let Some(id) = item.id() else {
            return missing_id(kind);
        };
        let gateway = gateway.clone();
        let path = format!("{}/key", member_path(kind, &id));
        async move { gateway.get(&path).await }.boxed()
    })
}

fn member_path(kind: ResourceKind, id: &EntityId) -> String {
    format!("{}/{}", kind.path(), id.as_path_segment())
}

fn missing_id(kind: ResourceKind) -> BoxFuture<'static, Outcome> {
    let detail = FailureDetail::message(format!("{} has no id", kind.label()));
    async move { Outcome::Failure(detail) }.boxed()
}

/// Add `offset` to a numeric (or numeric-text) `key` field.
fn offset_key(offset: i64) -> ResultMap {
    Arc::new(move |item| {
        let key = match item.get("key") {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match key {
            Some(key) => item.with("key", key.saturating_add(offset)),
            None => item,
        }
    })
}

// ── Publish hooks ───────────────────────────────────────────────────

fn publish_created(list: Weak<ListController>, display: FieldTransform) -> SettleHook {
    Box::new(move |settled| {
        let Settled::Succeeded { result, .. } = settled else {
            return;
        };
        if result.is_empty() {
            return;
        }
        let Some(list) = live(&list) else {
            return;
        };
        list.push_item(Some(display(result.clone())));
    })
}

fn publish_updated(list: Weak<ListController>, display: FieldTransform) -> SettleHook {
    Box::new(move |settled| {
        let Settled::Succeeded { submitted, result } = settled else {
            return;
        };
        let Some(list) = live(&list) else {
            return;
        };
        // An empty 2xx body means the server took the item as sent.
        let fresh = if result.is_empty() { submitted } else { result };
        if let Some(id) = submitted.id().or_else(|| fresh.id()) {
            list.remove_item(&id);
        }
        list.push_item(Some(display(fresh.clone())));
    })
}

fn publish_deleted(list: Weak<ListController>) -> SettleHook {
    Box::new(move |settled| {
        let Settled::Succeeded { submitted, .. } = settled else {
            return;
        };
        let Some(list) = live(&list) else {
            return;
        };
        if let Some(id) = submitted.id() {
            list.remove_item(&id);
        }
    })
}

fn live(list: &Weak<ListController>) -> Option<Arc<ListController>> {
    let upgraded = list.upgrade();
    if upgraded.is_none() {
        debug!("binding torn down, discarding settled result");
    }
    upgraded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::confirm::FixedAnswer;
    use crate::form::Submission;
    use crate::form::tests::Recorder;

    /// Gateway that records calls and answers from a canned outcome.
    struct Canned {
        outcome: Outcome,
        calls: Mutex<Vec<(String, String, Option<Item>)>>,
    }

    impl Canned {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, verb: &str, path: &str, body: Option<&Item>) -> Outcome {
            self.calls
                .lock()
                .unwrap()
                .push((verb.into(), path.into(), body.cloned()));
            self.outcome.clone()
        }

        fn calls(&self) -> Vec<(String, String, Option<Item>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Gateway for Canned {
        async fn get(&self, path: &str) -> Outcome {
            self.record("GET", path, None)
        }
        async fn post(&self, path: &str, body: &Item) -> Outcome {
            self.record("POST", path, Some(body))
        }
        async fn put(&self, path: &str, body: &Item) -> Outcome {
            self.record("PUT", path, Some(body))
        }
        async fn delete(&self, path: &str) -> Outcome {
            self.record("DELETE", path, None)
        }
        async fn fetch_collection(&self, _path: &str, _rel: &str) -> Result<Vec<Item>, FailureDetail> {
            Ok(Vec::new())
        }
    }

    fn seed() -> Vec<Item> {
        (1..=3)
            .map(|n| Item::empty().with("id", n).with("name", format!("sensor {n}")))
            .collect()
    }

    fn bind(gateway: Arc<Canned>) -> ResourceBinding {
        ResourceBinding::builder(ResourceKind::Sensors, gateway, Arc::new(Recorder::default()))
            .seed(seed())
            .build()
    }

    #[tokio::test]
    async fn create_posts_outbound_body_and_pushes_display_form() {
        let created = Item::empty().with("id", 9).with("minValue", 1234.5);
        let gateway = Canned::new(Outcome::Success(created));
        let binding = ResourceBinding::builder(ResourceKind::Sensors, gateway.clone(), Arc::new(Recorder::default()))
            .outbound(transform::normalize_numbers(&["minValue"]))
            .display(Arc::new(|item: Item| item.with("shown", true)))
            .build();

        binding.create().set_item(Item::empty().with("minValue", "1,234.5"));
        binding.create().submit().await;

        let calls = gateway.calls();
        assert_eq!(calls[0].0, "POST");
        assert_eq!(calls[0].1, "sensors");
        assert_eq!(calls[0].2.as_ref().unwrap().get("minValue"), Some(&json!(1234.5)));

        let head = binding.list().snapshot()[0].clone();
        assert_eq!(head.id(), Some(EntityId::Number(9)));
        assert_eq!(head.get("shown"), Some(&json!(true)));
        assert_eq!(binding.create().result().unwrap().get("shown"), None);
    }

    #[tokio::test]
    async fn update_replaces_entry_at_front() {
        let gateway = Canned::new(Outcome::Success(Item::empty().with("id", 2).with("name", "renamed")));
        let binding = bind(gateway.clone());

        binding.update().set_item(Item::empty().with("id", "2").with("name", "renamed"));
        binding.update().submit().await;

        assert_eq!(gateway.calls()[0].1, "sensors/2");
        let names: Vec<_> = binding
            .list()
            .snapshot()
            .iter()
            .map(|i| i.get_str("name").unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["renamed", "sensor 1", "sensor 3"]);
    }

    #[tokio::test]
    async fn update_without_id_fails_locally() {
        let gateway = Canned::new(Outcome::Success(Item::empty()));
        let binding = bind(gateway.clone());

        binding.update().set_item(Item::empty().with("name", "orphan"));
        let submission = binding.update().submit().await;

        assert!(!submission.is_success());
        assert!(gateway.calls().is_empty());
        assert_eq!(binding.list().len(), 3);
        assert_eq!(binding.update().state().failure.unwrap().message, "Sensor has no id");
    }

    #[tokio::test]
    async fn delete_removes_submitted_id() {
        let gateway = Canned::new(Outcome::Success(Item::empty()));
        let binding = bind(gateway.clone());

        binding.delete().form().set_item(seed()[1].clone());
        binding.delete().delete_item().await;

        assert_eq!(gateway.calls()[0], ("DELETE".into(), "sensors/2".into(), None));
        assert_eq!(binding.list().len(), 2);
        assert_eq!(binding.list().find(&EntityId::Number(2)), None);
    }

    #[tokio::test]
    async fn declined_delete_keeps_list() {
        let gateway = Canned::new(Outcome::Success(Item::empty()));
        let binding = ResourceBinding::builder(ResourceKind::Rules, gateway.clone(), Arc::new(Recorder::default()))
            .seed(seed())
            .confirm_with(Arc::new(FixedAnswer(false)))
            .build();

        binding.delete().form().set_item(seed()[0].clone());
        assert_eq!(binding.delete().delete_item().await, Submission::Declined);

        assert!(gateway.calls().is_empty());
        assert_eq!(binding.list().len(), 3);
    }

    #[tokio::test]
    async fn key_lookup_offsets_and_leaves_list_alone() {
        let gateway = Canned::new(Outcome::Success(Item::empty().with("key", "1000")));
        let binding = ResourceBinding::builder(ResourceKind::Devices, gateway.clone(), Arc::new(Recorder::default()))
            .seed(seed())
            .key_offset(24)
            .build();
        let key = binding.key().unwrap();

        key.set_item(Item::empty().with("id", 4));
        key.submit().await;

        assert_eq!(gateway.calls()[0].1, "devices/4/key");
        assert_eq!(key.result().unwrap().get("key"), Some(&json!(1024)));
        assert_eq!(key.item().id(), Some(EntityId::Number(4)));
        assert_eq!(binding.list().len(), 3);
    }

    #[test]
    fn key_lookup_only_where_supported() {
        let gateway = Canned::new(Outcome::Success(Item::empty()));
        let binding = ResourceBinding::builder(ResourceKind::Users, gateway, Arc::new(Recorder::default())).build();
        assert!(binding.key().is_none());
    }

    #[tokio::test]
    async fn torn_down_binding_discards_late_result() {
        let gateway = Canned::new(Outcome::Success(Item::empty().with("id", 7)));
        let binding = bind(gateway);
        let create = binding.create().clone();
        let list = Arc::downgrade(binding.list());

        drop(binding);
        create.set_item(Item::empty().with("name", "late"));
        let submission = create.submit().await;

        assert!(submission.is_success());
        assert!(list.upgrade().is_none());
    }
}
