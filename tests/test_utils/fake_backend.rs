//! In-process stand-in for the reconciliation service, served by axum on an ephemeral port.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use compareflow::{api::HttpBackend, config::ApiConfig};
use serde_json::{json, Value};
use tokio::{net::TcpListener, task::JoinHandle};

use super::fixtures::{self, TOKEN};

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct FakeState {
    pub connections: Vec<Value>,
    pub validations: Vec<Value>,
    pub tables: Vec<String>,
    pub failing_test: bool,
    /// Answer schema queries with `null` lists, as a database without tables does.
    pub null_schema: bool,
    pub requests: Vec<Recorded>,
    next_id: u64,
}

impl FakeState {
    fn allocate_id(&mut self) -> u64 {
        let used = self
            .connections
            .iter()
            .chain(self.validations.iter())
            .filter_map(|v| v["id"].as_u64())
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(used) + 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    pub url: String,
    pub state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/connections", get(list_connections).post(create_connection))
            .route(
                "/connections/{id}",
                get(get_connection).put(update_connection).delete(delete_connection),
            )
            .route("/connections/{id}/test", post(test_connection))
            .route("/connections/{id}/tables", get(list_tables))
            .route("/connections/{id}/tables/{table}/columns", get(list_columns))
            .route("/validations", get(list_validations).post(create_validation))
            .route(
                "/validations/{id}",
                get(get_validation).put(update_validation).delete(delete_validation),
            )
            .route("/validations/{id}/run", post(run_validation))
            .route("/validations/{id}/status", get(validation_status))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url: format!("http://{addr}"), state, server }
    }

    pub fn client(&self) -> HttpBackend {
        HttpBackend::new(&ApiConfig { base_url: self.url.clone(), timeout_secs: 5 }).unwrap()
    }

    pub fn seed_connection(&self, connection: Value) {
        self.state.lock().unwrap().connections.push(connection);
    }

    pub fn seed_validation(&self, validation: Value) {
        self.state.lock().unwrap().validations.push(validation);
    }

    pub fn set_tables(&self, tables: &[&str]) {
        self.state.lock().unwrap().tables = tables.iter().map(|t| t.to_string()).collect();
    }

    pub fn serve_null_schema(&self) {
        self.state.lock().unwrap().null_schema = true;
    }

    pub fn fail_connection_tests(&self) {
        self.state.lock().unwrap().failing_test = true;
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Number of requests seen for `method path`.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method && r.path == path).count()
    }

    pub fn connection_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.connections.iter().filter_map(|c| c["name"].as_str().map(String::from)).collect()
    }

    pub fn stored_connection(&self, name: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.connections.iter().find(|c| c["name"] == name).cloned()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state.lock().unwrap().requests.push(Recorded {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization,
    });
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorize(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

fn find(items: &[Value], id: u64) -> Option<&Value> {
    items.iter().find(|v| v["id"] == id)
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({ "access_token": TOKEN, "user": fixtures::user_json() })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == "taken" {
        return error(StatusCode::BAD_REQUEST, "Username already exists");
    }
    let user = json!({ "id": 2, "username": body["username"], "email": body["email"] });
    (StatusCode::CREATED, Json(json!({ "access_token": TOKEN, "user": user }))).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    match authorize(&headers) {
        Ok(()) => Json(fixtures::user_json()).into_response(),
        Err(response) => response,
    }
}

async fn list_connections(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    Json(Value::Array(state.lock().unwrap().connections.clone())).into_response()
}

async fn get_connection(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    match find(&state.lock().unwrap().connections, id) {
        Some(connection) => Json(connection.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Connection not found"),
    }
}

async fn create_connection(State(state): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    if body["name"].as_str().map_or(true, str::is_empty) {
        return error(StatusCode::BAD_REQUEST, "Name is required");
    }
    let mut state = state.lock().unwrap();
    body["id"] = json!(state.allocate_id());
    body["created_at"] = json!("2024-03-05T12:00:00Z");
    state.connections.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_connection(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut state = state.lock().unwrap();
    let Some(slot) = state.connections.iter_mut().find(|c| c["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Connection not found");
    };
    body["id"] = json!(id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_connection(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut state = state.lock().unwrap();
    let before = state.connections.len();
    state.connections.retain(|c| c["id"] != id);
    if state.connections.len() == before {
        return error(StatusCode::NOT_FOUND, "Connection not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn test_connection(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let state = state.lock().unwrap();
    if find(&state.connections, id).is_none() {
        return error(StatusCode::NOT_FOUND, "Connection not found");
    }
    if state.failing_test {
        let body = json!({ "success": false, "message": "Login failed for user 'sa'" });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    } else {
        Json(json!({ "success": true, "message": "Connection successful" })).into_response()
    }
}

async fn list_tables(State(state): State<Shared>, headers: HeaderMap, Path(_id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let state = state.lock().unwrap();
    if state.null_schema {
        return Json(json!({ "tables": null })).into_response();
    }
    Json(json!({ "tables": state.tables })).into_response()
}

async fn list_columns(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((_id, table)): Path<(u64, String)>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    if state.lock().unwrap().null_schema {
        return Json(json!({ "columns": null, "total": 0 })).into_response();
    }
    Json(json!({
        "columns": [
            { "name": format!("{table}_id"), "data_type": "int", "nullable": false },
            { "name": "total", "data_type": "decimal", "nullable": true }
        ]
    }))
    .into_response()
}

async fn list_validations(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    Json(Value::Array(state.lock().unwrap().validations.clone())).into_response()
}

async fn get_validation(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    match find(&state.lock().unwrap().validations, id) {
        Some(validation) => Json(validation.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Validation not found"),
    }
}

async fn create_validation(State(state): State<Shared>, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut state = state.lock().unwrap();
    body["id"] = json!(state.allocate_id());
    state.validations.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_validation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(mut body): Json<Value>,
) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut state = state.lock().unwrap();
    let Some(slot) = state.validations.iter_mut().find(|v| v["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Validation not found");
    };
    body["id"] = json!(id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_validation(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut state = state.lock().unwrap();
    state.validations.retain(|v| v["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn run_validation(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    let mut state = state.lock().unwrap();
    let Some(validation) = state.validations.iter_mut().find(|v| v["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Validation not found");
    };
    validation["status"] = json!("completed");
    validation["results"] = fixtures::completed_results();
    Json(validation.clone()).into_response()
}

async fn validation_status(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    if let Err(response) = authorize(&headers) {
        return response;
    }
    match find(&state.lock().unwrap().validations, id) {
        Some(v) => Json(json!({ "id": id, "status": v["status"], "updated_at": v["updated_at"] })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Validation not found"),
    }
}
