use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::config::Chain;
use crate::merge::{InvalidLimit, Limit, TopDappsMerger};
use crate::models::TopDappsResponse;
use crate::scan_stats::ScanSnapshot;
use crate::storage::HotStore;

#[derive(Clone)]
pub struct AppState {
    pub merger: TopDappsMerger,
    pub chains: Arc<Vec<Chain>>,
    pub store: HotStore,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    InvalidLimit(#[from] InvalidLimit),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidLimit(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn top_dapps(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<TopDappsResponse>, ApiError> {
    let limit = Limit::parse(query.limit.as_deref())?;
    let dapps = state.merger.merge_top_dapps(&state.chains, limit).await;
    Ok(Json(TopDappsResponse { dapps }))
}

async fn hot_dapps(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<TopDappsResponse>, ApiError> {
    let limit = Limit::parse(query.limit.as_deref())?;
    let dapps = state
        .store
        .hot_ranking(&state.chains, state.merger.protocols(), limit)
        .await?;
    Ok(Json(TopDappsResponse { dapps }))
}

async fn scan_stats(State(state): State<AppState>) -> Json<ScanSnapshot> {
    Json(state.merger.stats().snapshot())
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/top-dapps", get(top_dapps))
        .route("/top-dapps/hot", get(hot_dapps))
        .route("/stats/scan", get(scan_stats))
        .with_state(state)
}

pub async fn run_http_server(addr: &str, state: AppState) -> Result<()> {
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
