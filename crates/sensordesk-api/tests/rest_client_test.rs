#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sensordesk_api::{Error, JsonObject, RestClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client =
        RestClient::from_reqwest(&format!("{}/api", server.uri()), reqwest::Client::new())
            .unwrap();
    (server, client)
}

fn object(value: serde_json::Value) -> JsonObject {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_object() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "name": "Greenhouse" })),
        )
        .mount(&server)
        .await;

    let device = client.get("devices/7").await.unwrap();
    assert_eq!(device.get("id"), Some(&json!(7)));
    assert_eq!(device.get("name"), Some(&json!("Greenhouse")));
}

#[tokio::test]
async fn test_post_sends_body_and_returns_created() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/sensors"))
        .and(body_json(json!({ "name": "Soil probe" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": 12, "name": "Soil probe" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .post("sensors", &object(json!({ "name": "Soil probe" })))
        .await
        .unwrap();
    assert_eq!(created.get("id"), Some(&json!(12)));
}

#[tokio::test]
async fn test_put_updates() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/rules/3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": 3, "threshold": 40 })),
        )
        .mount(&server)
        .await;

    let updated = client
        .put("rules/3", &object(json!({ "threshold": 40 })))
        .await
        .unwrap();
    assert_eq!(updated.get("threshold"), Some(&json!(40)));
}

#[tokio::test]
async fn test_delete_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/actuators/2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let body = client.delete("actuators/2").await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_list_embedded_collection() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_embedded": {
                "devices": [
                    { "id": 1, "name": "Pump house" },
                    { "id": 2, "name": "Barn" }
                ]
            },
            "_links": { "self": { "href": "/api/devices" } }
        })))
        .mount(&server)
        .await;

    let devices = client.list("devices", "devices").await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].get("name"), Some(&json!("Barn")));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;
    let transport = TransportConfig::default().with_api_token("s3cret".to_string().into());
    let client = RestClient::new(&server.uri(), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client.get("users/1").await.unwrap();
}

// ── Failure classification ──────────────────────────────────────────

#[tokio::test]
async fn test_validation_errors_forwarded_untouched() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [
                { "entity": "Device", "property": "name", "invalidValue": "", "message": "required" },
                { "entity": "Device", "property": "name", "invalidValue": "", "message": "duplicate" },
                { "entity": "Device", "property": "serial", "message": "malformed" }
            ]
        })))
        .mount(&server)
        .await;

    let result = client.post("devices", &object(json!({ "name": "" }))).await;

    match result {
        Err(Error::Validation { status, errors }) => {
            assert_eq!(status, 400);
            assert_eq!(errors.len(), 3);
            assert_eq!(errors[0].message(), Some("required"));
            assert_eq!(errors[1].message(), Some("duplicate"));
            assert_eq!(errors[2].property, "serial");
        }
        other => panic!("expected Validation error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_object_success_is_failure() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/models/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])))
        .mount(&server)
        .await;

    let result = client.get("models/1").await;
    assert!(
        matches!(result, Err(Error::UnexpectedShape { .. })),
        "expected UnexpectedShape, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_with_message() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/sensors/9"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "sensor is in use" })),
        )
        .mount(&server)
        .await;

    let err = client.delete("sensors/9").await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(err.field_errors().is_empty());
    assert!(err.to_string().contains("sensor is in use"));
}

#[tokio::test]
async fn test_forbidden_is_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let result = client.get("users/1").await;
    assert!(
        matches!(result, Err(Error::Authentication { status: 403, .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.get("devices/404").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // Port 9 (discard) is essentially never listening on test hosts.
    let client = RestClient::from_reqwest("http://127.0.0.1:9/api", reqwest::Client::new()).unwrap();
    let err = client.get("devices").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.is_transient());
}
