use std::sync::Arc;

use validator::Validate;

use crate::cache::{CacheInvalidator, RelatedIds, ResourceType};
use crate::dto::ApiResponse;
use crate::models::{CreatePhotoRequest, Photo};
use crate::repositories::TrigRepository;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PhotoController {
    repository: Arc<dyn TrigRepository>,
    invalidator: CacheInvalidator,
}

impl PhotoController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            invalidator: state.invalidator(),
        }
    }

    pub async fn create(&self, request: CreatePhotoRequest) -> AppResult<ApiResponse<Photo>> {
        request.validate()?;

        let photo = self.repository.create_photo(&request).await?;
        let invalidated = self.invalidate(&photo).await;

        Ok(ApiResponse::success_with_message(photo, "Foto añadida".to_string()).invalidated(invalidated))
    }

    pub async fn delete(&self, id: i64) -> AppResult<ApiResponse<Photo>> {
        let photo = self
            .repository
            .delete_photo(id)
            .await?
            .ok_or_else(|| not_found_error("Photo", &id.to_string()))?;
        let invalidated = self.invalidate(&photo).await;

        Ok(ApiResponse::success_with_message(photo, "Foto eliminada".to_string()).invalidated(invalidated))
    }

    async fn invalidate(&self, photo: &Photo) -> u64 {
        let related = RelatedIds::new()
            .with("log_id", photo.log_id)
            .with("trig_id", photo.trig_id)
            .with("user_id", photo.user_id);

        self.invalidator
            .invalidate(ResourceType::Photo, Some(&photo.id.to_string()), &related)
            .await
    }
}
