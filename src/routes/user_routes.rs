use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use crate::cache::Cached;
use crate::controllers::UserController;
use crate::dto::{ApiResponse, ListParams};
use crate::models::{TrigLog, UpdateUserRequest, User};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(get_user).patch(update_user))
        .route("/:id/logs", get(get_user_logs))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Cached<User>, AppError> {
    UserController::new(&state).get(id, &headers).await
}

async fn get_user_logs(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Cached<Vec<TrigLog>>, AppError> {
    UserController::new(&state).logs(id, params, &headers).await
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let response = UserController::new(&state).update(id, request).await?;
    Ok(Json(response))
}
