#![allow(clippy::unwrap_used)]
// End-to-end synchronization tests: console + bindings over a wiremock
// server, plus a gated fake gateway for in-flight behavior.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::oneshot;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sensordesk_api::RestClient;
use sensordesk_core::{
    ConfirmationGate, Console, ConsoleConfig, EntityId, ErrorDescriptor, FailureDetail,
    FixedAnswer, FormPhase, Gateway, Item, ListController, NotificationKind, Notifier, Outcome,
    ResourceBinding, ResourceKind, RestGateway, Settled, Submission,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder(Mutex<Vec<(String, NotificationKind)>>);

impl Notifier for Recorder {
    fn notify(&self, message: &str, kind: NotificationKind) {
        self.0.lock().unwrap().push((message.to_owned(), kind));
    }
}

impl Recorder {
    fn messages(&self) -> Vec<(String, NotificationKind)> {
        self.0.lock().unwrap().clone()
    }
}

async fn setup(confirm: Option<bool>) -> (MockServer, Console, Arc<Recorder>) {
    let server = MockServer::start().await;
    let base = format!("{}/api/", server.uri());
    let client = RestClient::from_reqwest(&base, reqwest::Client::new()).unwrap();
    let recorder = Arc::new(Recorder::default());
    let console = Console::new(
        ConsoleConfig::new(base.parse().unwrap()),
        Arc::new(RestGateway::new(client)),
        recorder.clone(),
        confirm.map(|answer| Arc::new(FixedAnswer(answer)) as Arc<dyn ConfirmationGate>),
    );
    (server, console, recorder)
}

fn ids(list: &ListController) -> Vec<Option<EntityId>> {
    list.snapshot().iter().map(Item::id).collect()
}

fn numbered(ids: &[i64]) -> Vec<Item> {
    ids.iter().map(|id| Item::empty().with("id", *id)).collect()
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_success_clears_form_and_prepends() {
    let (server, console, recorder) = setup(None).await;
    let created = json!({ "id": 42, "name": "Soil probe", "minValue": 1500 });

    Mock::given(method("POST"))
        .and(path("/api/sensors"))
        .and(body_json(json!({ "name": "Soil probe", "minValue": 1500 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let binding = console.bind(ResourceKind::Sensors, numbered(&[1, 2]));
    let create = binding.create();
    create.set_item(Item::empty().with("name", "Soil probe").with("minValue", "1,500"));

    assert!(create.submit().await.is_success());

    let state = create.state();
    assert_eq!(state.item, Item::empty());
    assert_eq!(state.result, Some(Item::try_from(created.clone()).unwrap()));
    assert_eq!(state.phase, FormPhase::Idle);

    let list = binding.list().snapshot();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0], Item::try_from(created).unwrap());
    assert_eq!(
        recorder.messages(),
        vec![("Created successfully!".to_owned(), NotificationKind::Success)]
    );
}

#[tokio::test]
async fn test_create_display_formatting_lands_in_list_only() {
    let (server, console, _) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": 5, "createdAt": 1_700_000_000_000_i64 })),
        )
        .mount(&server)
        .await;

    let binding = console.bind(ResourceKind::Devices, Vec::new());
    binding.create().set_item(Item::empty().with("name", "Barn"));
    binding.create().submit().await;

    assert_eq!(
        binding.list().snapshot()[0].get_str("createdAt"),
        Some("2023-11-14 22:13:20")
    );
    assert_eq!(
        binding.create().result().unwrap().get("createdAt"),
        Some(&json!(1_700_000_000_000_i64))
    );
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_failure_keeps_item_and_list() {
    let (server, console, recorder) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [
                { "property": "name", "msg": "required" },
                { "property": "name", "msg": "duplicate" },
                { "property": "serial", "msg": "malformed" }
            ]
        })))
        .mount(&server)
        .await;

    let binding = console.bind(ResourceKind::Devices, numbered(&[1, 2, 3]));
    let draft = Item::empty().with("name", "").with("serial", "??");
    binding.create().set_item(draft.clone());

    let submission = binding.create().submit().await;

    let state = binding.create().state();
    assert_eq!(state.item, draft);
    assert_eq!(state.errors.message("name"), Some("required"));
    assert_eq!(state.errors.message("serial"), Some("malformed"));
    assert_eq!(state.errors.len(), 2);
    assert_eq!(state.result, None);
    assert!(matches!(
        submission,
        Submission::Settled(Settled::Failed { .. })
    ));
    assert_eq!(binding.list().snapshot().as_slice(), numbered(&[1, 2, 3]).as_slice());
    assert_eq!(recorder.messages()[0].1, NotificationKind::Error);
}

#[tokio::test]
async fn test_update_failure_without_field_errors_still_notifies() {
    let (server, console, recorder) = setup(None).await;

    Mock::given(method("PUT"))
        .and(path("/api/rules/2"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "rule is active" })),
        )
        .mount(&server)
        .await;

    let binding = console.bind(ResourceKind::Rules, numbered(&[1, 2, 3]));
    binding.update().set_item(Item::empty().with("id", 2).with("threshold", "40"));
    binding.update().submit().await;

    let state = binding.update().state();
    assert!(state.errors.is_empty());
    assert_eq!(state.failure.unwrap().status, Some(409));
    assert_eq!(binding.list().len(), 3);

    let (message, kind) = recorder.messages().remove(0);
    assert_eq!(kind, NotificationKind::Error);
    assert!(message.contains("rule is active"), "got: {message}");
}

// ── Update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_moves_fresh_record_to_front() {
    let (server, console, _) = setup(None).await;

    Mock::given(method("PUT"))
        .and(path("/api/actuators/3"))
        .and(body_json(json!({ "id": "3", "value": 75 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "value": 75 })))
        .mount(&server)
        .await;

    let binding = console.bind(ResourceKind::Actuators, numbered(&[1, 2, 3]));
    binding.update().set_item(Item::empty().with("id", "3").with("value", "75"));
    binding.update().submit().await;

    assert_eq!(
        ids(binding.list()),
        vec![
            Some(EntityId::Number(3)),
            Some(EntityId::Number(1)),
            Some(EntityId::Number(2)),
        ]
    );
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let (server, console, recorder) = setup(Some(false)).await;

    let binding = console.bind(ResourceKind::Sensors, numbered(&[1, 2, 3]));
    binding.delete().form().set_item(Item::empty().with("id", 2));

    assert_eq!(binding.delete().delete_item().await, Submission::Declined);

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(binding.list().len(), 3);
    assert!(recorder.messages().is_empty());
}

#[tokio::test]
async fn test_confirmed_delete_removes_exactly_one() {
    let (server, console, recorder) = setup(Some(true)).await;

    Mock::given(method("DELETE"))
        .and(path("/api/sensors/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let binding = console.bind(ResourceKind::Sensors, numbered(&[1, 2, 3]));
    binding.delete().form().set_item(Item::empty().with("id", 2));

    assert!(binding.delete().delete_item().await.is_success());

    assert_eq!(binding.list().snapshot().as_slice(), numbered(&[1, 3]).as_slice());
    assert_eq!(
        recorder.messages(),
        vec![("Deleted successfully!".to_owned(), NotificationKind::Success)]
    );
}

// ── Seeding and key lookup ──────────────────────────────────────────

#[tokio::test]
async fn test_open_seeds_from_embedded_collection() {
    let (server, console, _) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": { "users": [ { "id": 1 }, { "id": 2 } ] }
        })))
        .mount(&server)
        .await;

    let binding = console.open(ResourceKind::Users).await.unwrap();
    assert_eq!(binding.list().snapshot().as_slice(), numbered(&[1, 2]).as_slice());
}

#[tokio::test]
async fn test_key_lookup_writes_offset_result() {
    let (server, console, _) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/devices/8/key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": 100 })))
        .mount(&server)
        .await;

    let binding = console
        .binding(ResourceKind::Devices)
        .seed(numbered(&[8]))
        .key_offset(7)
        .build();
    let key = binding.key().unwrap();
    key.set_item(Item::empty().with("id", 8));
    key.submit().await;

    assert_eq!(key.result().unwrap().get("key"), Some(&json!(107)));
    assert_eq!(binding.list().len(), 1);
}

// ── Push no-ops ─────────────────────────────────────────────────────

#[test]
fn test_push_none_leaves_collection() {
    let list = ListController::new(numbered(&[1, 2, 3]));
    list.push_item(None);
    assert_eq!(list.snapshot().as_slice(), numbered(&[1, 2, 3]).as_slice());
}

// ── In-flight exclusivity ───────────────────────────────────────────

/// Gateway whose first POST blocks until released, then fails with a
/// field error; later POSTs fail with a different one.
struct Held {
    release: Mutex<Option<oneshot::Receiver<()>>>,
    posts: Mutex<u32>,
}

#[async_trait]
impl Gateway for Held {
    async fn get(&self, _path: &str) -> Outcome {
        Outcome::Success(Item::empty())
    }

    async fn post(&self, _path: &str, _body: &Item) -> Outcome {
        let release = self.release.lock().unwrap().take();
        *self.posts.lock().unwrap() += 1;
        if let Some(release) = release {
            let _ = release.await;
            return Outcome::Failure(FailureDetail::validation(
                400,
                vec![ErrorDescriptor::new("name").with("msg", "from A")],
            ));
        }
        Outcome::Failure(FailureDetail::validation(
            400,
            vec![ErrorDescriptor::new("name").with("msg", "from B")],
        ))
    }

    async fn put(&self, _path: &str, _body: &Item) -> Outcome {
        Outcome::Success(Item::empty())
    }

    async fn delete(&self, _path: &str) -> Outcome {
        Outcome::Success(Item::empty())
    }

    async fn fetch_collection(&self, _path: &str, _rel: &str) -> Result<Vec<Item>, FailureDetail> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_second_submit_is_rejected_while_first_in_flight() {
    let (release, held) = oneshot::channel();
    let gateway = Arc::new(Held {
        release: Mutex::new(Some(held)),
        posts: Mutex::new(0),
    });
    let binding = ResourceBinding::builder(
        ResourceKind::Models,
        gateway.clone(),
        Arc::new(Recorder::default()),
    )
    .build();
    let create = binding.create().clone();
    create.set_item(Item::empty().with("name", "M-1"));

    let first = tokio::spawn({
        let create = create.clone();
        async move { create.submit().await }
    });
    while !create.is_submitting() {
        tokio::task::yield_now().await;
    }

    assert_eq!(create.submit().await, Submission::Busy);
    release.send(()).unwrap();
    first.await.unwrap();

    assert_eq!(*gateway.posts.lock().unwrap(), 1);
    assert_eq!(create.errors().message("name"), Some("from A"));
    assert_eq!(create.phase(), FormPhase::Idle);

    // Once settled, the controller accepts the next attempt.
    create.submit().await;
    assert_eq!(create.errors().message("name"), Some("from B"));
}
