use axum::{
    extract::{Query, State},
    middleware,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::cache::CacheStats;
use crate::dto::ApiResponse;
use crate::middleware::require_admin;
use crate::services::{CacheAdminService, FlushResult};
use crate::state::AppState;
use crate::utils::errors::AppError;

#[derive(Debug, Deserialize)]
pub struct FlushQuery {
    pub pattern: Option<String>,
}

/// Rutas de admin del cache, protegidas por `require_admin`
pub fn create_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/cache/stats", get(get_cache_stats))
        .route("/cache", delete(flush_cache))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

async fn get_cache_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CacheStats>>, AppError> {
    let stats = CacheAdminService::new(state.cache.clone()).get_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

async fn flush_cache(
    State(state): State<AppState>,
    Query(query): Query<FlushQuery>,
) -> Result<Json<ApiResponse<FlushResult>>, AppError> {
    let result = CacheAdminService::new(state.cache.clone())
        .flush(query.pattern.as_deref())
        .await?;
    let message = format!("{} claves eliminadas", result.deleted);
    Ok(Json(ApiResponse::success_with_message(result, message)))
}
