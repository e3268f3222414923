use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};

use crate::cache::Cached;
use crate::controllers::LogController;
use crate::dto::{ApiResponse, ListParams};
use crate::models::{CreateLogRequest, TrigLog, UpdateLogRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_log_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_logs).post(create_log))
        .route("/export", get(export_logs))
        .route("/:id", get(get_log).patch(update_log).delete(delete_log))
}

async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Cached<Vec<TrigLog>>, AppError> {
    LogController::new(&state).list(params, &headers).await
}

async fn export_logs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Cached<Vec<TrigLog>>, AppError> {
    LogController::new(&state).export(params, &headers).await
}

async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Cached<TrigLog>, AppError> {
    LogController::new(&state).get(id, &headers).await
}

async fn create_log(
    State(state): State<AppState>,
    Json(request): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TrigLog>>), AppError> {
    let response = LogController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateLogRequest>,
) -> Result<Json<ApiResponse<TrigLog>>, AppError> {
    let response = LogController::new(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<TrigLog>>, AppError> {
    let response = LogController::new(&state).delete(id).await?;
    Ok(Json(response))
}
