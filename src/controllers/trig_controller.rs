use std::sync::Arc;

use axum::http::HeaderMap;
use validator::Validate;

use crate::cache::{
    CacheAside, CacheClient, CacheInvalidator, CacheRequest, Cached, ReadOutcome, RelatedIds,
    ResourceType,
};
use crate::dto::{ApiResponse, ListParams};
use crate::models::{Photo, Trig, TrigLog, UpdateTrigRequest};
use crate::repositories::{Scope, TrigRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct TrigController {
    repository: Arc<dyn TrigRepository>,
    cache: CacheClient,
    aside: CacheAside,
    invalidator: CacheInvalidator,
}

impl TrigController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
            aside: state.cache_aside(),
            invalidator: state.invalidator(),
        }
    }

    pub async fn list(&self, params: ListParams, headers: &HeaderMap) -> AppResult<Cached<Vec<Trig>>> {
        let key = self
            .cache
            .key(ResourceType::Trigs)
            .sub("list")
            .params(params.cache_params());
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                let trigs = repository.list_trigs(&params).await?;
                Ok::<_, AppError>(ReadOutcome::Body(trigs))
            })
            .await
    }

    pub async fn get(&self, id: i64, headers: &HeaderMap) -> AppResult<Cached<Trig>> {
        let key = self.cache.key(ResourceType::Trig).id(id);
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                repository
                    .find_trig(id)
                    .await?
                    .map(ReadOutcome::Body)
                    .ok_or_else(|| not_found_error("Trig", &id.to_string()))
            })
            .await
    }

    /// Logs de un pilar. Caduca como los listados de logs.
    pub async fn logs(
        &self,
        id: i64,
        params: ListParams,
        headers: &HeaderMap,
    ) -> AppResult<Cached<Vec<TrigLog>>> {
        let key = self
            .cache
            .key(ResourceType::Trig)
            .id(id)
            .sub("logs")
            .params(params.cache_params());
        let request = CacheRequest::new(key)
            .ttl(ResourceType::Logs.default_ttl())
            .bypass_from(headers);
        let repository = self.repository.clone();

        self.aside
            .fetch(request, move || async move {
                ensure_trig(repository.as_ref(), id).await?;
                let logs = repository.list_logs(Scope::Trig(id), &params).await?;
                Ok::<_, AppError>(ReadOutcome::Body(logs))
            })
            .await
    }

    pub async fn photos(
        &self,
        id: i64,
        params: ListParams,
        headers: &HeaderMap,
    ) -> AppResult<Cached<Vec<Photo>>> {
        let key = self
            .cache
            .key(ResourceType::Trig)
            .id(id)
            .sub("photos")
            .params(params.cache_params());
        let request = CacheRequest::new(key)
            .ttl(ResourceType::Photos.default_ttl())
            .bypass_from(headers);
        let repository = self.repository.clone();

        self.aside
            .fetch(request, move || async move {
                ensure_trig(repository.as_ref(), id).await?;
                let photos = repository.list_photos(Scope::Trig(id), &params).await?;
                Ok::<_, AppError>(ReadOutcome::Body(photos))
            })
            .await
    }

    pub async fn update(&self, id: i64, request: UpdateTrigRequest) -> AppResult<ApiResponse<Trig>> {
        request.validate()?;

        let trig = self
            .repository
            .update_trig(id, &request)
            .await?
            .ok_or_else(|| not_found_error("Trig", &id.to_string()))?;

        let invalidated = self
            .invalidator
            .invalidate(ResourceType::Trig, Some(&id.to_string()), &RelatedIds::new())
            .await;

        Ok(ApiResponse::success_with_message(trig, "Pilar actualizado".to_string()).invalidated(invalidated))
    }
}

async fn ensure_trig(repository: &dyn TrigRepository, id: i64) -> AppResult<()> {
    match repository.find_trig(id).await? {
        Some(_) => Ok(()),
        None => Err(not_found_error("Trig", &id.to_string())),
    }
}
