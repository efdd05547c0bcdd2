use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bookrec_core::{ArtifactStore, Artifacts, DisplayRecord, PopularBook, RecError, StoreStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{spawn_blocking, JoinError};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const MAX_K: usize = 10;
pub const MAX_POPULAR: usize = 50;
pub const MAX_TITLES: usize = 100;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub title: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 5 }

#[derive(Deserialize)]
pub struct PopularParams {
    #[serde(default = "default_n")]
    pub n: usize,
}
fn default_n() -> usize { 25 }

#[derive(Deserialize)]
pub struct TitlesParams {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}
fn default_limit() -> usize { 20 }

#[derive(Serialize)]
pub struct RecommendResponse {
    pub title: String,
    pub k: usize,
    pub took_s: f64,
    pub results: Vec<DisplayRecord>,
}

#[derive(Serialize)]
pub struct PopularResponse {
    pub took_s: f64,
    pub results: Vec<PopularBook>,
}

#[derive(Serialize)]
pub struct TitlesResponse {
    pub total: usize,
    pub titles: Vec<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ArtifactStore>,
}

/// JSON error body carrying the failure kind so callers can tell a bad pick
/// from a server without data.
pub enum ApiError {
    Rec(RecError),
    /// The blocking load task panicked or was cancelled.
    Task(String),
}

impl From<RecError> for ApiError {
    fn from(e: RecError) -> Self { ApiError::Rec(e) }
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self { ApiError::Task(e.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, kind) = match self {
            ApiError::Rec(e) => {
                let status = match &e {
                    RecError::ArtifactsMissing { .. } | RecError::ArtifactsIncompatible { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    RecError::TitleNotFound(_) => StatusCode::NOT_FOUND,
                    RecError::SchemaUnresolved { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.to_string(), e.kind())
            }
            ApiError::Task(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, "internal"),
        };
        (status, Json(serde_json::json!({ "error": error, "kind": kind }))).into_response()
    }
}

/// Loaded artifacts; a load that still has to touch the disk runs on the blocking pool.
async fn artifacts(store: &Arc<ArtifactStore>) -> Result<Arc<Artifacts>, ApiError> {
    if let Some(a) = store.loaded() {
        return Ok(a);
    }
    let store = Arc::clone(store);
    Ok(spawn_blocking(move || store.get()).await??)
}

pub fn build_app(data_dir: String) -> Result<Router> {
    // Load artifacts at startup; a failure is kept in the store and reported per request.
    let store = Arc::new(ArtifactStore::new(&data_dir));
    if let Err(e) = store.get() {
        tracing::warn!(data_dir = %data_dir, error = %e, "starting without artifacts");
    }
    Ok(router(AppState { store }))
}

pub fn router(state: AppState) -> Router {
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
        .route("/status", get(status_handler))
        .route("/reload", post(reload_handler))
        .route("/popular", get(popular_handler))
        .route("/titles", get(titles_handler))
        .route("/recommend", get(recommend_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StoreStatus> {
    Json(state.store.status())
}

pub async fn reload_handler(State(state): State<AppState>) -> Result<Json<StoreStatus>, ApiError> {
    let store = Arc::clone(&state.store);
    spawn_blocking(move || store.reload()).await??;
    tracing::info!("artifacts reloaded");
    Ok(Json(state.store.status()))
}

pub async fn popular_handler(State(state): State<AppState>, Query(params): Query<PopularParams>) -> Result<Json<PopularResponse>, ApiError> {
    let start = Instant::now();
    let artifacts = artifacts(&state.store).await?;
    let results = artifacts.popular(params.n.clamp(1, MAX_POPULAR))?;
    Ok(Json(PopularResponse { took_s: start.elapsed().as_secs_f64(), results }))
}

pub async fn titles_handler(State(state): State<AppState>, Query(params): Query<TitlesParams>) -> Result<Json<TitlesResponse>, ApiError> {
    let artifacts = artifacts(&state.store).await?;
    let titles = artifacts
        .search_titles(&params.q, params.limit.clamp(1, MAX_TITLES))
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(Json(TitlesResponse { total: artifacts.titles.len(), titles }))
}

pub async fn recommend_handler(State(state): State<AppState>, Query(params): Query<RecommendParams>) -> Result<Json<RecommendResponse>, ApiError> {
    let start = Instant::now();
    let k = params.k.clamp(1, MAX_K);
    let results = artifacts(&state.store).await?.recommend(&params.title, k)?;
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(title = %params.title, k, took_s, "recommend");
    Ok(Json(RecommendResponse { title: params.title, k, took_s, results }))
}
