// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process mock of the dashboard backend for client integration tests.
//!
//! Protected routes accept exactly `Bearer <valid_token>`. The refresh
//! endpoint can be gated (held until the test releases it) and switched
//! between issuing, failing, returning garbage, and hanging.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header::{AUTHORIZATION, LOCATION};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use obser::auth::store::{MemoryTokenStore, TokenStore};
use obser::auth::TokenPair;
use obser::client::ApiClient;
use obser::config::ClientConfig;

pub const EMAIL: &str = "ops@example.com";
pub const PASSWORD: &str = "secret";
pub const REFRESH_TOKEN: &str = "ref1";
pub const CREATED_AT: &str = "2026-01-01T00:00:00Z";

/// How the refresh endpoint answers.
#[derive(Debug, Clone)]
pub enum RefreshMode {
    Issue,
    Fail(StatusCode),
    Malformed,
    Hang,
}

/// One request observed by a protected route.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub uri: String,
    pub authorization: Option<String>,
}

pub struct MockState {
    pub valid_token: Mutex<String>,
    pub next_token: Mutex<String>,
    pub refresh_mode: Mutex<RefreshMode>,
    pub refresh_calls: AtomicU32,
    pub refresh_bodies: Mutex<Vec<Value>>,
    pub refresh_gate: Mutex<Option<Arc<Notify>>>,
    pub login_forms: Mutex<Vec<HashMap<String, String>>>,
    pub register_bodies: Mutex<Vec<Value>>,
    pub seen: Mutex<Vec<Seen>>,
    pub records: Mutex<HashMap<String, Vec<Value>>>,
    next_id: AtomicI64,
}

impl MockState {
    fn new() -> Self {
        Self {
            valid_token: Mutex::new("tok1".to_owned()),
            next_token: Mutex::new("tok2".to_owned()),
            refresh_mode: Mutex::new(RefreshMode::Issue),
            refresh_calls: AtomicU32::new(0),
            refresh_bodies: Mutex::new(Vec::new()),
            refresh_gate: Mutex::new(None),
            login_forms: Mutex::new(Vec::new()),
            register_bodies: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
            records: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

pub struct Backend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

/// Start a mock backend on an ephemeral port.
pub async fn start() -> anyhow::Result<Backend> {
    let state = Arc::new(MockState::new());
    let app = router(Arc::clone(&state));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Backend { base_url: format!("http://{addr}"), state })
}

impl Backend {
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.clone());
        config.timeout_ms = 5_000;
        config.refresh_timeout_ms = 2_000;
        config
    }

    pub fn client(&self, store: Arc<dyn TokenStore>) -> ApiClient {
        ApiClient::new(&self.config(), store)
    }

    /// Hold refresh responses until the returned handle is notified.
    pub fn gate_refresh(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.state.refresh_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn set_refresh_mode(&self, mode: RefreshMode) {
        *self.state.refresh_mode.lock() = mode;
    }

    /// Invalidate the current access token server-side; the next refresh
    /// issues `next`.
    pub fn rotate_server_token(&self, next: &str) {
        *self.state.valid_token.lock() = "revoked".to_owned();
        *self.state.next_token.lock() = next.to_owned();
    }

    pub fn refresh_calls(&self) -> u32 {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.seen.lock().clone()
    }

    /// Protected requests to `uri` that carried `Bearer <token>`.
    pub fn seen_with(&self, uri: &str, token: &str) -> usize {
        let expected = format!("Bearer {token}");
        self.state
            .seen
            .lock()
            .iter()
            .filter(|s| s.uri == uri && s.authorization.as_deref() == Some(expected.as_str()))
            .count()
    }

    pub fn seed_project(&self, code: &str) -> i64 {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst);
        let project = json!({
            "id": id,
            "code": code,
            "display_name": code.to_uppercase(),
            "kind": null,
            "created_at": CREATED_AT,
        });
        self.state.records.lock().entry("projects".to_owned()).or_default().push(project);
        id
    }
}

/// A store holding a pair the server no longer accepts.
pub fn stale_store() -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_pair(&TokenPair {
        access_token: "stale".to_owned(),
        refresh_token: REFRESH_TOKEN.to_owned(),
    }))
}

/// Poll `cond` until it holds, failing after a few seconds.
pub async fn wait_for(mut cond: impl FnMut() -> bool) -> anyhow::Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("condition not reached in time"))
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/token/refresh", post(refresh))
        .route("/api/v1/locked", get(locked))
        .route("/api/v1/moved", get(moved))
        .route("/api/v1/broken", get(broken))
        .route("/api/v1/projects/", get(list_projects).post(create_project))
        .route("/api/v1/projects/users", get(list_users))
        .route(
            "/api/v1/projects/{id}",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/api/v1/projects/{id}/{kind}", get(list_children).post(create_child))
        .route(
            "/api/v1/projects/{id}/{kind}/{item}",
            get(get_child).patch(update_child).delete(delete_child),
        )
        .with_state(state)
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

fn tokens(access: &str) -> Response {
    Json(json!({
        "access_token": access,
        "refresh_token": REFRESH_TOKEN,
        "token_type": "bearer",
    }))
    .into_response()
}

/// Record the request and check its bearer token.
fn check(s: &MockState, method: &Method, uri: &Uri, headers: &HeaderMap) -> Result<(), Response> {
    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(String::from);
    let expected = format!("Bearer {}", s.valid_token.lock());
    let ok = authorization.as_deref() == Some(expected.as_str());
    s.seen.lock().push(Seen { method: method.clone(), uri: uri.to_string(), authorization });
    if ok {
        Ok(())
    } else {
        Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

async fn login(State(s): State<Arc<MockState>>, Form(form): Form<HashMap<String, String>>) -> Response {
    s.login_forms.lock().push(form.clone());
    let good = form.get("username").map(String::as_str) == Some(EMAIL)
        && form.get("password").map(String::as_str) == Some(PASSWORD);
    if !good {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    }
    let access = s.valid_token.lock().clone();
    tokens(&access)
}

async fn register(State(s): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    s.register_bodies.lock().push(body.clone());
    if body["email"] == "taken@example.com" {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let access = s.valid_token.lock().clone();
    tokens(&access)
}

async fn refresh(State(s): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    s.refresh_calls.fetch_add(1, Ordering::SeqCst);
    s.refresh_bodies.lock().push(body.clone());

    let gate = s.refresh_gate.lock().clone();
    if let Some(gate) = gate {
        gate.notified().await;
    }

    let mode = s.refresh_mode.lock().clone();
    match mode {
        RefreshMode::Issue => {
            if body["refresh_token"] != REFRESH_TOKEN {
                return detail(StatusCode::UNAUTHORIZED, "Invalid refresh token");
            }
            let next = s.next_token.lock().clone();
            *s.valid_token.lock() = next.clone();
            Json(json!({ "access_token": next, "token_type": "bearer" })).into_response()
        }
        RefreshMode::Fail(status) => detail(status, "refresh unavailable"),
        RefreshMode::Malformed => Json(json!({ "token_type": "bearer" })).into_response(),
        RefreshMode::Hang => std::future::pending::<Response>().await,
    }
}

async fn locked(
    State(s): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    detail(StatusCode::UNAUTHORIZED, "Account locked")
}

async fn moved() -> Response {
    (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, "http://backend:8000/api/v1/projects/")])
        .into_response()
}

async fn broken() -> Response {
    detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn list_projects(
    State(s): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, usize>>,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    let skip = q.get("skip").copied().unwrap_or(0);
    let limit = q.get("limit").copied().unwrap_or(100);
    let records = s.records.lock();
    let page: Vec<Value> = records
        .get("projects")
        .map(|all| all.iter().skip(skip).take(limit).cloned().collect())
        .unwrap_or_default();
    Json(page).into_response()
}

async fn create_project(
    State(s): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    let id = s.next_id.fetch_add(1, Ordering::SeqCst);
    body["id"] = json!(id);
    body["created_at"] = json!(CREATED_AT);
    s.records.lock().entry("projects".to_owned()).or_default().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn list_users(
    State(s): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    Json(json!([{ "id": 1, "email": EMAIL }, { "id": 2, "email": "dev@example.com" }]))
        .into_response()
}

fn find(records: &[Value], field: &str, id: i64) -> Option<usize> {
    records.iter().position(|r| r[field].as_i64() == Some(id))
}

async fn get_project(
    State(s): State<Arc<MockState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    let records = s.records.lock();
    let all = records.get("projects").map(Vec::as_slice).unwrap_or_default();
    match find(all, "id", id) {
        Some(i) => Json(all[i].clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn update_project(
    State(s): State<Arc<MockState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    patch_record(&s, "projects", "id", id, &patch)
}

async fn delete_project(
    State(s): State<Arc<MockState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    remove_record(&s, "projects", "id", id)
}

fn child_key(project: i64, kind: &str) -> String {
    format!("{project}/{kind}")
}

/// Members are addressed by `user_id`, everything else by `id`.
fn child_id_field(kind: &str) -> &'static str {
    if kind == "members" {
        "user_id"
    } else {
        "id"
    }
}

async fn list_children(
    State(s): State<Arc<MockState>>,
    Path((project, kind)): Path<(i64, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    let records = s.records.lock();
    let list = records.get(&child_key(project, &kind)).cloned().unwrap_or_default();
    Json(list).into_response()
}

async fn create_child(
    State(s): State<Arc<MockState>>,
    Path((project, kind)): Path<(i64, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    let id = s.next_id.fetch_add(1, Ordering::SeqCst);
    body["id"] = json!(id);
    body["project_id"] = json!(project);
    body["created_at"] = json!(CREATED_AT);
    match kind.as_str() {
        "members" if body.get("role").is_none() => body["role"] = json!("viewer"),
        "services" if body.get("status").is_none() => body["status"] = json!("unknown"),
        _ => {}
    }
    s.records.lock().entry(child_key(project, &kind)).or_default().push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_child(
    State(s): State<Arc<MockState>>,
    Path((project, kind, item)): Path<(i64, String, i64)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    let records = s.records.lock();
    let all = records.get(&child_key(project, &kind)).map(Vec::as_slice).unwrap_or_default();
    match find(all, child_id_field(&kind), item) {
        Some(i) => Json(all[i].clone()).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn update_child(
    State(s): State<Arc<MockState>>,
    Path((project, kind, item)): Path<(i64, String, i64)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    patch_record(&s, &child_key(project, &kind), child_id_field(&kind), item, &patch)
}

async fn delete_child(
    State(s): State<Arc<MockState>>,
    Path((project, kind, item)): Path<(i64, String, i64)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = check(&s, &method, &uri, &headers) {
        return resp;
    }
    remove_record(&s, &child_key(project, &kind), child_id_field(&kind), item)
}

fn patch_record(s: &MockState, key: &str, field: &str, id: i64, patch: &Value) -> Response {
    let mut records = s.records.lock();
    let Some(all) = records.get_mut(key) else {
        return detail(StatusCode::NOT_FOUND, "Not found");
    };
    let Some(i) = find(all, field, id) else {
        return detail(StatusCode::NOT_FOUND, "Not found");
    };
    if let (Some(target), Some(fields)) = (all[i].as_object_mut(), patch.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
        target.insert("updated_at".to_owned(), json!("2026-01-02T00:00:00Z"));
    }
    Json(all[i].clone()).into_response()
}

fn remove_record(s: &MockState, key: &str, field: &str, id: i64) -> Response {
    let mut records = s.records.lock();
    let Some(all) = records.get_mut(key) else {
        return detail(StatusCode::NOT_FOUND, "Not found");
    };
    match find(all, field, id) {
        Some(i) => {
            all.remove(i);
            StatusCode::NO_CONTENT.into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Not found"),
    }
}
