use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};

use crate::controllers::PhotoController;
use crate::dto::ApiResponse;
use crate::models::{CreatePhotoRequest, Photo};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_photo_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_photo))
        .route("/:id", delete(delete_photo))
}

async fn create_photo(
    State(state): State<AppState>,
    Json(request): Json<CreatePhotoRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Photo>>), AppError> {
    let response = PhotoController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Photo>>, AppError> {
    let response = PhotoController::new(&state).delete(id).await?;
    Ok(Json(response))
}
