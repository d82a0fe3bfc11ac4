//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ev_webhook::config::AppConfig;
use ev_webhook::lifecycle::startup;

pub const VALIDATION_PATH: &str = "/v3/validations/email";
pub const CONTACTS_PATH: &str = "/v3/mc/contacts";
pub const ADMIN_KEY: &str = "admin-key";

/// Config pointing both providers at `server`, with small circuits and the
/// admin surface enabled.
pub fn config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.sendgrid.api_key = "test-key".into();
    config.sendgrid.contact_list_id = "list-1".into();
    config.sendgrid.validation_endpoint = format!("{}{}", server.uri(), VALIDATION_PATH);
    config.sendgrid.contacts_endpoint = format!("{}{}", server.uri(), CONTACTS_PATH);

    for circuit in [&mut config.circuits.email_validation, &mut config.circuits.contacts] {
        circuit.timeout_ms = 200;
        circuit.request_volume_threshold = 3;
        circuit.cool_down_ms = 60_000;
    }

    config.admin.enabled = true;
    config.admin.api_key = ADMIN_KEY.into();
    config
}

pub fn router(config: &AppConfig) -> Router {
    startup::build(config).unwrap().router()
}

/// Webhook payload carrying `email` the way the messaging provider sends it.
pub fn payload(email: &str) -> String {
    json!({ "Body": urlencoding::encode(email) }).to_string()
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Reply {
    /// Text inside `<Message>…</Message>`.
    pub fn message(&self) -> &str {
        let start = self.body.find("<Message>").map(|i| i + "<Message>".len()).unwrap();
        let end = self.body.find("</Message>").unwrap();
        &self.body[start..end]
    }
}

pub async fn post_webhook(router: &Router, body: impl Into<Body>) -> Reply {
    let response = router
        .clone()
        .oneshot(
            Request::post("/webhook")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Circuit snapshots from the admin endpoint, keyed by circuit name.
pub async fn circuit(router: &Router, name: &str) -> Value {
    let response = router
        .clone()
        .oneshot(
            Request::get("/admin/circuits")
                .header("authorization", format!("Bearer {}", ADMIN_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let circuits: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
    circuits
        .into_iter()
        .find(|c| c["name"] == name)
        .unwrap()
}

/// Validation provider answering every request with `result`.
pub async fn mount_verdict(server: &MockServer, result: Value) {
    Mock::given(method("POST"))
        .and(path(VALIDATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
        .mount(server)
        .await;
}

pub async fn mount_contacts(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("PUT"))
        .and(path(CONTACTS_PATH))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}
