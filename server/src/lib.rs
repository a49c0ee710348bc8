use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use search_core::{
    AutocompleteResponse, BooleanResponse, DocumentSummary, EngineStats, Metadata, SearchEngine,
    SearchResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize { 10 }

#[derive(Deserialize)]
pub struct AutocompleteParams {
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_suggestions")]
    pub limit: usize,
}
fn default_suggestions() -> usize { 5 }

#[derive(Deserialize)]
pub struct BooleanParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Deserialize)]
pub struct IndexFileRequest {
    pub id: String,
    pub filename: String,
    pub content: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub admin_token: Option<String>,
}

/// Handler error rendered as `{"error": ...}` with a status code.
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn build_app(engine: Arc<SearchEngine>, admin_token: Option<String>) -> Router {
    let app_state = AppState { engine, admin_token };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/autocomplete", get(autocomplete_handler))
        .route("/boolean", get(boolean_handler))
        .route("/stats", get(stats_handler))
        .route("/documents", post(index_handler))
        .route("/documents/:id", get(doc_handler).delete(remove_handler))
        .route("/files", post(index_file_handler))
        .route("/cache/clear", post(clear_cache_handler))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn require_text(name: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, format!("missing or empty '{name}'")));
    }
    Ok(())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> ApiResult<Json<SearchResponse>> {
    require_text("q", &params.q)?;
    Ok(Json(state.engine.search(&params.q, params.limit)))
}

pub async fn autocomplete_handler(State(state): State<AppState>, Query(params): Query<AutocompleteParams>) -> ApiResult<Json<AutocompleteResponse>> {
    require_text("prefix", &params.prefix)?;
    Ok(Json(state.engine.autocomplete(&params.prefix, params.limit)))
}

pub async fn boolean_handler(State(state): State<AppState>, Query(params): Query<BooleanParams>) -> ApiResult<Json<BooleanResponse>> {
    require_text("q", &params.q)?;
    Ok(Json(state.engine.boolean_search(&params.q)))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine.stats())
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<DocumentSummary>> {
    state
        .engine
        .get_document(&id)
        .map(Json)
        .ok_or_else(|| ApiError(StatusCode::NOT_FOUND, "not found".into()))
}

// --- Write endpoints, gated by ADMIN_TOKEN when it is set ---
async fn index_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<IndexRequest>) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    require_text("id", &req.id)?;
    state.engine.index_document(&req.id, &req.content, req.metadata);
    Ok(StatusCode::CREATED)
}

async fn index_file_handler(State(state): State<AppState>, headers: HeaderMap, Json(req): Json<IndexFileRequest>) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    require_text("id", &req.id)?;
    state.engine.index_file(&req.id, &req.filename, &req.content);
    Ok(StatusCode::CREATED)
}

async fn remove_handler(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    if state.engine.remove_document(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError(StatusCode::NOT_FOUND, "not found".into()))
    }
}

async fn clear_cache_handler(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    authorize(&state, &headers)?;
    state.engine.clear_cache();
    Ok(StatusCode::NO_CONTENT)
}

fn authorize(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(required) = &state.admin_token else {
        return Ok(());
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required.as_str() {
        Ok(())
    } else {
        Err(ApiError(StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
