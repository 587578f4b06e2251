// crates/devtron-contract-suites/tests/helpers/devtron_stub.rs
// ============================================================================
// Module: Devtron API Stub
// Description: In-memory stand-in for the Devtron REST API.
// Purpose: Exercise every API suite end to end without a real backend.
// Dependencies: axum, serde_json
// ============================================================================

//! The stub honors the contract the suites assert: bearer authentication,
//! `201`/`202`/`204` statuses, echoed fields, and `400 {errors}` on invalid
//! payloads. Created applications get numeric ids, as Devtron assigns them;
//! every other resource gets a prefixed string id.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use super::server::StubServer;
use super::server::spawn_router;

/// Token the stub accepts.
pub const STUB_TOKEN: &str = "stub-api-token";

/// Resource collections held by the stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Collection {
    /// `/api/v1/applications`
    Applications,
    /// `/api/v1/chart-repositories`
    Repositories,
    /// `/api/v1/deployment-pipelines`
    Pipelines,
    /// `/api/v1/deployments`
    Deployments,
    /// `/api/v1/users`
    Users,
}

/// Records keyed by collection, then by id.
#[derive(Default)]
struct Store {
    /// Last assigned numeric suffix.
    next_id: u64,
    /// Stored records.
    records: BTreeMap<Collection, BTreeMap<String, Value>>,
}

impl Store {
    /// Store holding one record per seeded fixture id.
    fn seeded() -> Self {
        let mut store = Self::default();
        store.put(Collection::Applications, json!({"id": "test-app-id", "name": "Seeded App"}));
        store.put(
            Collection::Repositories,
            json!({"id": "test-repo-id", "name": "Seeded Repo", "url": "https://charts.example.com"}),
        );
        store.put(
            Collection::Pipelines,
            json!({"id": "test-pipeline-id", "name": "Seeded Pipeline", "applicationId": "test-app-id"}),
        );
        store.put(
            Collection::Deployments,
            json!({"id": "previous-deployment-id", "pipelineId": "test-pipeline-id", "status": "succeeded"}),
        );
        store.put(
            Collection::Users,
            json!({"id": "test-user-id", "email": "test-user@devtron.ai", "role": "developer"}),
        );
        store
    }

    /// Inserts or replaces a record under its `id`.
    fn put(&mut self, collection: Collection, record: Value) {
        let key = id_text(&record["id"]);
        self.records.entry(collection).or_default().insert(key, record);
    }

    /// Assigns an id and stores the record.
    fn create(&mut self, collection: Collection, mut record: Value) -> Value {
        self.next_id += 1;
        let id = match collection {
            Collection::Applications => json!(self.next_id),
            Collection::Repositories => json!(format!("repo-{}", self.next_id)),
            Collection::Pipelines => json!(format!("pipeline-{}", self.next_id)),
            Collection::Deployments => json!(format!("deployment-{}", self.next_id)),
            Collection::Users => json!(format!("user-{}", self.next_id)),
        };
        record["id"] = id;
        self.put(collection, record.clone());
        record
    }

    /// Looks up a record.
    fn get(&self, collection: Collection, id: &str) -> Option<&Value> {
        self.records.get(&collection).and_then(|records| records.get(id))
    }

    /// Looks up a record by a JSON id, which must match the stored id's type.
    fn get_exact(&self, collection: Collection, id: &Value) -> Option<&Value> {
        self.get(collection, &id_text(id)).filter(|record| record["id"] == *id)
    }

    /// Returns every record in a collection.
    fn list(&self, collection: Collection) -> Vec<Value> {
        self.records.get(&collection).map(|records| records.values().cloned().collect()).unwrap_or_default()
    }

    /// Merges `patch` into a record; `id` is immutable.
    fn update(&mut self, collection: Collection, id: &str, patch: &Value) -> Option<Value> {
        let record = self.records.get_mut(&collection)?.get_mut(id)?;
        if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                if key != "id" {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
        Some(record.clone())
    }

    /// Deletes a record, returning whether it existed.
    fn remove(&mut self, collection: Collection, id: &str) -> bool {
        self.records.get_mut(&collection).is_some_and(|records| records.remove(id).is_some())
    }
}

/// Renders an id value as its path segment.
fn id_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Shared handler state.
#[derive(Clone)]
struct StubState {
    /// Resource store.
    store: Arc<Mutex<Store>>,
    /// Request log.
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubState {
    /// Runs `f` with the store locked.
    fn with_store<T>(&self, f: impl FnOnce(&mut Store) -> T) -> T {
        let mut store = self.store.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut store)
    }
}

/// Handle for a running Devtron stub.
pub struct DevtronStub {
    /// Running server.
    server: StubServer,
    /// State shared with the handlers.
    state: StubState,
}

impl DevtronStub {
    /// Returns the stub base URL.
    pub fn base_url(&self) -> &str {
        self.server.base_url()
    }

    /// Returns `METHOD path` for every request received, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Returns the number of stored records in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        self.state.with_store(|store| store.list(collection).len())
    }
}

/// Spawns a stub pre-populated with the seeded fixture ids.
pub fn spawn_devtron_stub() -> Result<DevtronStub, String> {
    spawn_with_store(Store::seeded())
}

/// Spawns a stub with no pre-existing resources.
pub fn spawn_empty_devtron_stub() -> Result<DevtronStub, String> {
    spawn_with_store(Store::default())
}

/// Builds the router over `store` and serves it.
fn spawn_with_store(store: Store) -> Result<DevtronStub, String> {
    let state = StubState {
        store: Arc::new(Mutex::new(store)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/api/v1/applications", get(list_applications).post(create_application))
        .route("/api/v1/applications/{id}", get(get_application).patch(update_application))
        .route("/api/v1/applications/{id}/deployments", get(application_deployments))
        .route("/api/v1/chart-repositories", get(list_repositories).post(create_repository))
        .route(
            "/api/v1/chart-repositories/{id}",
            patch(update_repository).delete(delete_repository),
        )
        .route("/api/v1/deployment-pipelines", post(create_pipeline))
        .route("/api/v1/deployments", post(trigger_deployment))
        .route("/api/v1/deployments/rollback", post(rollback_deployment))
        .route("/api/v1/users", get(list_users).post(create_user))
        .route("/api/v1/users/reset-password", post(reset_password))
        .route("/api/v1/users/{id}", patch(update_user).delete(delete_user))
        .layer(middleware::from_fn(authorize))
        .layer(middleware::from_fn_with_state(state.clone(), record_request))
        .with_state(state.clone());
    let server = spawn_router("devtron stub", app)?;
    Ok(DevtronStub {
        server,
        state,
    })
}

// ============================================================================
// SECTION: Middleware
// ============================================================================

/// Logs `METHOD path` for every request.
async fn record_request(State(state): State<StubState>, request: Request, next: Next) -> Response {
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(format!("{} {}", request.method(), request.uri().path()));
    }
    next.run(request).await
}

/// Rejects requests without the stub bearer token.
async fn authorize(request: Request, next: Next) -> Response {
    let expected = format!("Bearer {STUB_TOKEN}");
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if authorized {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "invalid or missing token"})))
            .into_response()
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// `200` with a JSON body.
fn ok(value: Value) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

/// `201` with a JSON body.
fn created(value: Value) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

/// `404` for unknown ids.
fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))).into_response()
}

/// `400` with an `errors` array.
fn invalid(errors: Vec<(&str, &str)>) -> Response {
    let errors: Vec<Value> = errors
        .into_iter()
        .map(|(field, message)| json!({"field": field, "message": message}))
        .collect();
    (StatusCode::BAD_REQUEST, Json(json!({"errors": errors}))).into_response()
}

/// Returns a string field or `""`.
fn text<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or_default()
}

// ============================================================================
// SECTION: Applications
// ============================================================================

/// `GET /api/v1/applications`.
async fn list_applications(State(state): State<StubState>) -> Response {
    ok(Value::Array(state.with_store(|store| store.list(Collection::Applications))))
}

/// `POST /api/v1/applications`; `name` is required.
async fn create_application(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    if text(&body, "name").is_empty() {
        return invalid(vec![("name", "name is required")]);
    }
    created(state.with_store(|store| store.create(Collection::Applications, body)))
}

/// `GET /api/v1/applications/{id}`.
async fn get_application(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    state
        .with_store(|store| store.get(Collection::Applications, &id).cloned())
        .map_or_else(not_found, ok)
}

/// `PATCH /api/v1/applications/{id}`.
async fn update_application(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state
        .with_store(|store| store.update(Collection::Applications, &id, &body))
        .map_or_else(not_found, ok)
}

/// `GET /api/v1/applications/{id}/deployments`.
async fn application_deployments(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    state.with_store(|store| {
        if store.get(Collection::Applications, &id).is_none() {
            return not_found();
        }
        let deployments: Vec<Value> = store
            .list(Collection::Deployments)
            .into_iter()
            .filter(|deployment| {
                store
                    .get(Collection::Pipelines, text(deployment, "pipelineId"))
                    .is_some_and(|pipeline| id_text(&pipeline["applicationId"]) == id)
            })
            .collect();
        ok(Value::Array(deployments))
    })
}

// ============================================================================
// SECTION: Chart Repositories
// ============================================================================

/// `GET /api/v1/chart-repositories`.
async fn list_repositories(State(state): State<StubState>) -> Response {
    ok(Value::Array(state.with_store(|store| store.list(Collection::Repositories))))
}

/// `POST /api/v1/chart-repositories`; credentials are echoed back but never
/// stored.
async fn create_repository(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut errors = Vec::new();
    if text(&body, "name").is_empty() {
        errors.push(("name", "name is required"));
    }
    let url = text(&body, "url");
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(("url", "url must be an http(s) URL"));
    }
    if !errors.is_empty() {
        return invalid(errors);
    }
    let mut record = body.clone();
    if let Some(object) = record.as_object_mut() {
        object.remove("credentials");
    }
    let mut response = state.with_store(|store| store.create(Collection::Repositories, record));
    if let Some(credentials) = body.get("credentials") {
        response["credentials"] = credentials.clone();
    }
    created(response)
}

/// `PATCH /api/v1/chart-repositories/{id}`.
async fn update_repository(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state
        .with_store(|store| store.update(Collection::Repositories, &id, &body))
        .map_or_else(not_found, ok)
}

/// `DELETE /api/v1/chart-repositories/{id}`.
async fn delete_repository(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    if state.with_store(|store| store.remove(Collection::Repositories, &id)) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

// ============================================================================
// SECTION: Deployments
// ============================================================================

/// `POST /api/v1/deployment-pipelines`; `applicationId` must carry the
/// application id's JSON type.
async fn create_pipeline(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    state.with_store(|store| {
        if text(&body, "name").is_empty() {
            return invalid(vec![("name", "name is required")]);
        }
        if store.get_exact(Collection::Applications, &body["applicationId"]).is_none() {
            return invalid(vec![("applicationId", "unknown application")]);
        }
        created(store.create(Collection::Pipelines, body))
    })
}

/// `POST /api/v1/deployments`.
async fn trigger_deployment(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut errors = Vec::new();
    for field in ["pipelineId", "branch", "commitHash"] {
        if text(&body, field).is_empty() {
            errors.push((field, "value is required"));
        }
    }
    if !errors.is_empty() {
        return invalid(errors);
    }
    state.with_store(|store| {
        if store.get(Collection::Pipelines, text(&body, "pipelineId")).is_none() {
            return not_found();
        }
        let mut record = body.clone();
        record["status"] = json!("in_progress");
        let deployment = store.create(Collection::Deployments, record);
        (StatusCode::ACCEPTED, Json(deployment)).into_response()
    })
}

/// `POST /api/v1/deployments/rollback`.
async fn rollback_deployment(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let patch = json!({"status": "rolled_back", "reason": text(&body, "reason")});
    state
        .with_store(|store| store.update(Collection::Deployments, text(&body, "deploymentId"), &patch))
        .map_or_else(not_found, ok)
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// `GET /api/v1/users`.
async fn list_users(State(state): State<StubState>) -> Response {
    ok(Value::Array(state.with_store(|store| store.list(Collection::Users))))
}

/// `POST /api/v1/users`; the password is dropped.
async fn create_user(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut errors = Vec::new();
    if !text(&body, "email").contains('@') {
        errors.push(("email", "email is invalid"));
    }
    if text(&body, "username").is_empty() {
        errors.push(("username", "username is required"));
    }
    if !matches!(text(&body, "role"), "admin" | "developer" | "viewer") {
        errors.push(("role", "role is invalid"));
    }
    if !errors.is_empty() {
        return invalid(errors);
    }
    let mut record: Map<String, Value> = body.as_object().cloned().unwrap_or_default();
    record.remove("password");
    created(state.with_store(|store| store.create(Collection::Users, Value::Object(record))))
}

/// `PATCH /api/v1/users/{id}`.
async fn update_user(
    State(state): State<StubState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.with_store(|store| store.update(Collection::Users, &id, &body)).map_or_else(not_found, ok)
}

/// `DELETE /api/v1/users/{id}`.
async fn delete_user(State(state): State<StubState>, Path(id): Path<String>) -> Response {
    if state.with_store(|store| store.remove(Collection::Users, &id)) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found()
    }
}

/// `POST /api/v1/users/reset-password`.
async fn reset_password(Json(body): Json<Value>) -> Response {
    let email = text(&body, "email");
    if !email.contains('@') || text(&body, "newPassword").is_empty() {
        return invalid(vec![("email", "email and newPassword are required")]);
    }
    ok(json!({"message": format!("Password reset successful for {email}")}))
}
