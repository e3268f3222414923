use std::sync::Arc;

use axum::http::HeaderMap;
use validator::Validate;

use crate::cache::{
    CacheAside, CacheClient, CacheInvalidator, CacheRequest, Cached, ReadOutcome, RelatedIds,
    ResourceType,
};
use crate::dto::{ApiResponse, ListParams};
use crate::models::{TrigLog, UpdateUserRequest, User};
use crate::repositories::{Scope, TrigRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct UserController {
    repository: Arc<dyn TrigRepository>,
    cache: CacheClient,
    aside: CacheAside,
    invalidator: CacheInvalidator,
}

impl UserController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
            aside: state.cache_aside(),
            invalidator: state.invalidator(),
        }
    }

    pub async fn get(&self, id: i64, headers: &HeaderMap) -> AppResult<Cached<User>> {
        let key = self.cache.key(ResourceType::User).id(id);
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                repository
                    .find_user(id)
                    .await?
                    .map(ReadOutcome::Body)
                    .ok_or_else(|| not_found_error("User", &id.to_string()))
            })
            .await
    }

    pub async fn logs(
        &self,
        id: i64,
        params: ListParams,
        headers: &HeaderMap,
    ) -> AppResult<Cached<Vec<TrigLog>>> {
        let key = self
            .cache
            .key(ResourceType::User)
            .id(id)
            .sub("logs")
            .params(params.cache_params());
        let request = CacheRequest::new(key)
            .ttl(ResourceType::Logs.default_ttl())
            .bypass_from(headers);
        let repository = self.repository.clone();

        self.aside
            .fetch(request, move || async move {
                if repository.find_user(id).await?.is_none() {
                    return Err(not_found_error("User", &id.to_string()));
                }
                let logs = repository.list_logs(Scope::User(id), &params).await?;
                Ok::<_, AppError>(ReadOutcome::Body(logs))
            })
            .await
    }

    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> AppResult<ApiResponse<User>> {
        request.validate()?;

        let user = self
            .repository
            .update_user(id, &request)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))?;

        // El nombre aparece embebido en listados de logs y fotos
        let invalidated = self
            .invalidator
            .invalidate(ResourceType::User, Some(&id.to_string()), &RelatedIds::new())
            .await;

        Ok(ApiResponse::success_with_message(user, "Perfil actualizado".to_string()).invalidated(invalidated))
    }
}
