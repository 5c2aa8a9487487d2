#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path as UrlPath, RawQuery, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Map, Value};

use projectdesk::backend::{AccountApi, DocumentStore, FileStorage, Query};
use projectdesk::config::AppConfig;
use projectdesk::error::{AppError, AppResult};
use projectdesk::models::User;
use projectdesk::testing::MemoryBackend;

pub const PROJECT_ID: &str = "stub-project";

/// What the client sent, minus the body
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub project: Option<String>,
    pub response_format: Option<String>,
    pub session: Option<String>,
}

#[derive(Clone)]
struct StubState {
    memory: Arc<MemoryBackend>,
    tokens: Arc<Mutex<HashSet<String>>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Appwrite-shaped HTTP stub backed by the in-memory store
pub struct StubBackend {
    pub base_url: String,
    pub memory: Arc<MemoryBackend>,
    state: StubState,
}

impl StubBackend {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = StubState {
            memory: MemoryBackend::new(),
            tokens: Arc::new(Mutex::new(HashSet::new())),
            seen: Arc::new(Mutex::new(Vec::new())),
        };

        let documents = "/v1/databases/:database/collections/:collection/documents";
        let app = Router::new()
            .route(documents, post(create_document).get(list_documents))
            .route(
                &format!("{}/:id", documents),
                get(get_document).patch(update_document).delete(delete_document),
            )
            .route("/v1/account", get(get_account).post(create_account))
            .route("/v1/account/prefs", patch(update_prefs))
            .route("/v1/account/sessions/email", post(create_email_session))
            .route("/v1/account/sessions/:id", delete(delete_session))
            .route("/v1/storage/buckets/:bucket/files/:file", delete(delete_file))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind stub backend")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url,
            memory: state.memory.clone(),
            state,
        })
    }

    /// Client configuration pointing at this stub
    pub fn config(&self, state_dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.backend.endpoint = format!("{}/v1", self.base_url);
        config.backend.project_id = PROJECT_ID.to_string();
        config.state.dir = Some(state_dir.to_path_buf());
        config
    }

    /// Signs `user` in and returns the carrier a client would have received
    pub fn sign_in(&self, user: User) -> String {
        self.memory.sign_in(user);
        let token = projectdesk::backend::unique_id();
        self.state.tokens.lock().unwrap().insert(token.clone());
        carrier(&token)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

fn carrier(token: &str) -> String {
    json!({ format!("a_session_{}", PROJECT_ID): token }).to_string()
}

async fn record(State(state): State<StubState>, request: Request, next: Next) -> Response {
    let seen = {
        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        SeenRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().map(str::to_string),
            project: header("x-appwrite-project"),
            response_format: header("x-appwrite-response-format"),
            session: header("x-fallback-cookies"),
        }
    };
    state.seen.lock().unwrap().push(seen);
    next.run(request).await
}

fn error_response(err: AppError) -> Response {
    let (status, kind) = match &err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "document_not_found".to_string()),
        AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "general_unauthorized_scope".to_string()),
        AppError::Remote { status, code, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code.clone().unwrap_or_else(|| "general_unknown".to_string()),
        ),
        _ => (StatusCode::BAD_REQUEST, "general_argument_invalid".to_string()),
    };
    let body = json!({ "message": err.to_string(), "type": kind, "code": status.as_u16() });
    (status, Json(body)).into_response()
}

fn reply<T: Serialize>(status: StatusCode, result: AppResult<T>) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(err) => error_response(err),
    }
}

fn no_content(result: AppResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn authorize(state: &StubState, headers: &HeaderMap) -> AppResult<String> {
    let token = headers
        .get("x-fallback-cookies")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| serde_json::from_str::<Map<String, Value>>(raw).ok())
        .and_then(|cookies| {
            cookies
                .get(&format!("a_session_{}", PROJECT_ID))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
    match token {
        Some(token) if state.tokens.lock().unwrap().contains(&token) => Ok(token),
        _ => Err(AppError::unauthenticated("User (role: guests) missing scope (account)")),
    }
}

fn object(body: &Value, key: &str) -> Map<String, Value> {
    body.get(key).and_then(Value::as_object).cloned().unwrap_or_default()
}

fn string(body: &Value, key: &str) -> String {
    body.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

async fn create_document(
    State(state): State<StubState>,
    UrlPath((_database, collection)): UrlPath<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let result = state
        .memory
        .create_document(&collection, &string(&body, "documentId"), object(&body, "data"))
        .await;
    reply(StatusCode::CREATED, result)
}

async fn list_documents(
    State(state): State<StubState>,
    UrlPath((_database, collection)): UrlPath<(String, String)>,
    RawQuery(raw): RawQuery,
) -> Response {
    let queries: AppResult<Vec<Query>> = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == "queries[]")
        .map(|(_, wire)| Query::from_wire(&wire))
        .collect();
    let result = match queries {
        Ok(queries) => state.memory.list_documents(&collection, &queries).await,
        Err(err) => Err(err),
    };
    reply(StatusCode::OK, result)
}

async fn get_document(
    State(state): State<StubState>,
    UrlPath((_database, collection, id)): UrlPath<(String, String, String)>,
) -> Response {
    reply(StatusCode::OK, state.memory.get_document(&collection, &id).await)
}

async fn update_document(
    State(state): State<StubState>,
    UrlPath((_database, collection, id)): UrlPath<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let result = state
        .memory
        .update_document(&collection, &id, object(&body, "data"))
        .await;
    reply(StatusCode::OK, result)
}

async fn delete_document(
    State(state): State<StubState>,
    UrlPath((_database, collection, id)): UrlPath<(String, String, String)>,
) -> Response {
    no_content(state.memory.delete_document(&collection, &id).await)
}

async fn get_account(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if let Err(err) = authorize(&state, &headers) {
        return error_response(err);
    }
    reply(StatusCode::OK, state.memory.get().await)
}

async fn create_account(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let name = body.get("name").and_then(Value::as_str);
    let result = state
        .memory
        .create(
            &string(&body, "userId"),
            &string(&body, "email"),
            &string(&body, "password"),
            name,
        )
        .await;
    reply(StatusCode::CREATED, result)
}

async fn update_prefs(State(state): State<StubState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(err) = authorize(&state, &headers) {
        return error_response(err);
    }
    reply(StatusCode::OK, state.memory.update_prefs(object(&body, "prefs")).await)
}

async fn create_email_session(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let result = state
        .memory
        .create_email_session(&string(&body, "email"), &string(&body, "password"))
        .await;
    let session = match result {
        Ok(session) => session,
        Err(err) => return error_response(err),
    };
    let token = projectdesk::backend::unique_id();
    state.tokens.lock().unwrap().insert(token.clone());

    let mut response = (StatusCode::CREATED, Json(session)).into_response();
    if let Ok(value) = HeaderValue::from_str(&carrier(&token)) {
        response.headers_mut().insert("x-fallback-cookies", value);
    }
    response
}

async fn delete_session(
    State(state): State<StubState>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    let token = match authorize(&state, &headers) {
        Ok(token) => token,
        Err(err) => return error_response(err),
    };
    state.tokens.lock().unwrap().remove(&token);
    no_content(state.memory.delete_session(&id).await)
}

async fn delete_file(
    State(state): State<StubState>,
    UrlPath((bucket, file)): UrlPath<(String, String)>,
) -> Response {
    no_content(state.memory.delete_file(&bucket, &file).await)
}
