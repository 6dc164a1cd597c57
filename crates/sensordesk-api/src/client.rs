// REST client for the sensordesk API.
//
// Every resource lives under `{base}/{resource}` and is a plain JSON object.
// This module owns URL construction and response classification; callers
// only ever see a JSON object or a classified `Error`.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{Collection, JsonObject, MessageBody, ValidationBody};

const PREVIEW_CHARS: usize = 200;

/// Async client for the REST API.
///
/// Cheap to clone (`reqwest::Client` is reference-counted internally).
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (caller manages headers and TLS).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins append
    /// instead of replacing the last segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The normalized base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"devices/7"`) onto the base URL.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<JsonObject, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_object(resp).await
    }

    pub async fn post(&self, path: &str, body: &JsonObject) -> Result<JsonObject, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_object(resp).await
    }

    pub async fn put(&self, path: &str, body: &JsonObject) -> Result<JsonObject, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_object(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<JsonObject, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_object(resp).await
    }

    /// Fetch a collection. Accepts the HAL envelope
    /// (`{ "_embedded": { "<rel>": [..] } }`) or a bare JSON array.
    pub async fn list(&self, path: &str, rel: &str) -> Result<Vec<JsonObject>, Error> {
        let url = self.url(path)?;
        debug!("GET {url} (collection rel={rel})");

        let resp = self.http.get(url).send().await?;
        let body = self.success_body(resp).await?;
        parse_collection(&body, rel)
    }

    // ── Response handling ────────────────────────────────────────────

    /// Classify a response that should carry a single JSON object.
    ///
    /// An empty success body (e.g. `204 No Content` on delete) yields an
    /// empty object; any other non-object body is `UnexpectedShape`.
    async fn handle_object(&self, resp: reqwest::Response) -> Result<JsonObject, Error> {
        let body = self.success_body(resp).await?;
        parse_object(&body)
    }

    async fn success_body(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.text().await?)
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        classify_failure(status.as_u16(), &raw)
    }
}

// ── Body classification (pure) ───────────────────────────────────────

fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

fn parse_object(body: &str) -> Result<JsonObject, Error> {
    if body.trim().is_empty() {
        return Ok(JsonObject::new());
    }
    let value: Value = serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::UnexpectedShape {
            expected: "a JSON object",
            preview: preview(&other.to_string()),
        }),
    }
}

fn parse_collection(body: &str, rel: &str) -> Result<Vec<JsonObject>, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(map) => {
            let collection: Collection =
                serde_json::from_value(Value::Object(map)).map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body: body.to_owned(),
                })?;
            match collection.embedded.get(rel) {
                Some(Value::Array(entries)) => entries.clone(),
                // Spring-style empty collections omit `_embedded` entirely.
                None => Vec::new(),
                Some(other) => {
                    return Err(Error::UnexpectedShape {
                        expected: "an array under _embedded",
                        preview: preview(&other.to_string()),
                    });
                }
            }
        }
        other => {
            return Err(Error::UnexpectedShape {
                expected: "a collection",
                preview: preview(&other.to_string()),
            });
        }
    };

    entries
        .into_iter()
        .map(|entry| match entry {
            Value::Object(map) => Ok(map),
            other => Err(Error::UnexpectedShape {
                expected: "a JSON object entry",
                preview: preview(&other.to_string()),
            }),
        })
        .collect()
}

fn classify_failure(status: u16, raw: &str) -> Error {
    if status == 401 || status == 403 {
        return Error::Authentication {
            status,
            message: message_from(raw).unwrap_or_else(|| "credentials rejected".into()),
        };
    }

    if let Ok(body) = serde_json::from_str::<ValidationBody>(raw) {
        if !body.errors.is_empty() {
            return Error::Validation {
                status,
                errors: body.errors,
            };
        }
    }

    Error::Http {
        status,
        message: message_from(raw).unwrap_or_else(|| {
            if raw.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                preview(raw)
            }
        }),
    }
}

fn message_from(raw: &str) -> Option<String> {
    let body = serde_json::from_str::<MessageBody>(raw).ok()?;
    body.message.or(body.error)
}
