use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub use axum::http::StatusCode;

/// Response captured from the preprod API for the example single-payment request.
pub const RECORDED_RESPONSE: &str = include_str!("../../test-vectors/recorded_response.json");

/// Submit reply for the recorded transaction.
pub const SUBMIT_RESPONSE: &str =
    r#"{"txId":"465de374d4e85130201aa6be3a575a54dcedd8be9cfc1e4111864fa86e959f6a"}"#;

pub const BUILD_PATH: &str = "/v2/services/transactions/build";
pub const SUBMIT_PATH: &str = "/v2/services/transactions/submit";
pub const HEALTH_PATH: &str = "/v2/services/health";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub change_address: String,
    pub outputs: Vec<BuildOutput>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildOutput {
    pub address: String,
    pub lovelace: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub transaction: String,
    pub signatures: Vec<String>,
}

/// Shape of a successful build reply. The mock serves `response_body`
/// verbatim; this type only exists so tests can check the schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    pub hash: String,
    pub complete: String,
    pub stripped: String,
    pub witness_set: String,
}

/// A request as seen by the mock, headers lower-cased.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
pub struct MockState {
    pub api_key: String,
    pub response_body: String,
    pub submit_response_body: String,
    pub forced_status: Option<StatusCode>,
    pub received: Arc<RwLock<Vec<ReceivedRequest>>>,
}

impl MockState {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            response_body: RECORDED_RESPONSE.to_string(),
            submit_response_body: SUBMIT_RESPONSE.to_string(),
            forced_status: None,
            received: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_response_body(mut self, body: &str) -> Self {
        self.response_body = body.to_string();
        self
    }

    pub fn with_submit_response_body(mut self, body: &str) -> Self {
        self.submit_response_body = body.to_string();
        self
    }

    /// Answer every authorized build or submit request with `status` instead of the body.
    pub fn with_forced_status(mut self, status: StatusCode) -> Self {
        self.forced_status = Some(status);
        self
    }
}

pub fn app(state: MockState) -> Router {
    Router::new()
        .route(BUILD_PATH, post(build_transaction))
        .route(SUBMIT_PATH, post(submit_transaction))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

pub async fn run(listener: TcpListener, state: MockState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

fn record(path: &str, headers: &HeaderMap, body: String) -> ReceivedRequest {
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    ReceivedRequest {
        path: path.to_string(),
        headers,
        body,
    }
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|key| key == state.api_key)
}

fn json_message(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "message": message }).to_string();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Shared gatekeeping for JSON POST routes: API key, content type, body
/// shape, then any forced status. `None` means the request may proceed.
fn reject<T: DeserializeOwned>(
    state: &MockState,
    headers: &HeaderMap,
    body: &str,
) -> Option<Response> {
    if !authorized(state, headers) {
        return Some(json_message(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if !is_json {
        return Some(json_message(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected application/json",
        ));
    }
    if let Err(e) = serde_json::from_str::<T>(body) {
        return Some(json_message(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()));
    }
    state
        .forced_status
        .map(|status| json_message(status, status.canonical_reason().unwrap_or("error")))
}

fn json_ok(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn build_transaction(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    info!(path = BUILD_PATH, len = body.len(), "build request received");
    state
        .received
        .write()
        .await
        .push(record(BUILD_PATH, &headers, body.clone()));

    if let Some(rejection) = reject::<BuildRequest>(&state, &headers, &body) {
        return rejection;
    }
    json_ok(state.response_body.clone())
}

async fn submit_transaction(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    info!(path = SUBMIT_PATH, len = body.len(), "submit request received");
    state
        .received
        .write()
        .await
        .push(record(SUBMIT_PATH, &headers, body.clone()));

    if let Some(rejection) = reject::<SubmitRequest>(&state, &headers, &body) {
        return rejection;
    }
    json_ok(state.submit_response_body.clone())
}

async fn health(State(state): State<MockState>, headers: HeaderMap) -> Response {
    state
        .received
        .write()
        .await
        .push(record(HEALTH_PATH, &headers, String::new()));
    if !authorized(&state, &headers) {
        return json_message(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    json_ok(r#"{"status":"ok"}"#.to_string())
}
