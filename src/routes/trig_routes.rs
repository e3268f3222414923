use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use crate::cache::Cached;
use crate::controllers::TrigController;
use crate::dto::{ApiResponse, ListParams};
use crate::models::{Photo, Trig, TrigLog, UpdateTrigRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_trig_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trigs))
        .route("/:id", get(get_trig).patch(update_trig))
        .route("/:id/logs", get(get_trig_logs))
        .route("/:id/photos", get(get_trig_photos))
}

async fn list_trigs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Cached<Vec<Trig>>, AppError> {
    TrigController::new(&state).list(params, &headers).await
}

async fn get_trig(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Cached<Trig>, AppError> {
    TrigController::new(&state).get(id, &headers).await
}

async fn get_trig_logs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Cached<Vec<TrigLog>>, AppError> {
    TrigController::new(&state).logs(id, params, &headers).await
}

async fn get_trig_photos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Cached<Vec<Photo>>, AppError> {
    TrigController::new(&state).photos(id, params, &headers).await
}

async fn update_trig(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateTrigRequest>,
) -> Result<Json<ApiResponse<Trig>>, AppError> {
    let response = TrigController::new(&state).update(id, request).await?;
    Ok(Json(response))
}
