use std::sync::Arc;

use axum::{body::Body, http::HeaderMap};
use futures::stream;
use validator::Validate;

use crate::cache::{
    CacheAside, CacheClient, CacheInvalidator, CacheRequest, Cached, ReadOutcome, RelatedIds,
    ResourceType,
};
use crate::dto::{ApiResponse, ListParams};
use crate::models::{CreateLogRequest, TrigLog, UpdateLogRequest};
use crate::repositories::{Scope, TrigRepository};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

pub struct LogController {
    repository: Arc<dyn TrigRepository>,
    cache: CacheClient,
    aside: CacheAside,
    invalidator: CacheInvalidator,
}

impl LogController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
            aside: state.cache_aside(),
            invalidator: state.invalidator(),
        }
    }

    pub async fn list(&self, params: ListParams, headers: &HeaderMap) -> AppResult<Cached<Vec<TrigLog>>> {
        let key = self
            .cache
            .key(ResourceType::Logs)
            .sub("list")
            .params(params.cache_params());
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                let logs = repository.list_logs(Scope::All, &params).await?;
                Ok::<_, AppError>(ReadOutcome::Body(logs))
            })
            .await
    }

    pub async fn get(&self, id: i64, headers: &HeaderMap) -> AppResult<Cached<TrigLog>> {
        let key = self.cache.key(ResourceType::Log).id(id);
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                repository
                    .find_log(id)
                    .await?
                    .map(ReadOutcome::Body)
                    .ok_or_else(|| not_found_error("Log", &id.to_string()))
            })
            .await
    }

    /// Exportación NDJSON. Pasa por el wrapper pero nunca se guarda.
    pub async fn export(&self, params: ListParams, headers: &HeaderMap) -> AppResult<Cached<Vec<TrigLog>>> {
        let key = self
            .cache
            .key(ResourceType::Logs)
            .sub("export")
            .params(params.cache_params());
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                let logs = repository.list_logs(Scope::All, &params).await?;
                let lines = stream::iter(logs.into_iter().map(|log| {
                    serde_json::to_string(&log).map(|mut line| {
                        line.push('\n');
                        line
                    })
                }));
                Ok::<_, AppError>(ReadOutcome::Stream {
                    content_type: NDJSON_CONTENT_TYPE,
                    body: Body::from_stream(lines),
                })
            })
            .await
    }

    pub async fn create(&self, request: CreateLogRequest) -> AppResult<ApiResponse<TrigLog>> {
        request.validate()?;

        if self.repository.find_trig(request.trig_id).await?.is_none() {
            return Err(not_found_error("Trig", &request.trig_id.to_string()));
        }
        if self.repository.find_user(request.user_id).await?.is_none() {
            return Err(not_found_error("User", &request.user_id.to_string()));
        }

        let log = self.repository.create_log(&request).await?;
        let invalidated = self.invalidate_log(&log).await;

        Ok(ApiResponse::success_with_message(log, "Log registrado".to_string()).invalidated(invalidated))
    }

    pub async fn update(&self, id: i64, request: UpdateLogRequest) -> AppResult<ApiResponse<TrigLog>> {
        request.validate()?;

        let log = self
            .repository
            .update_log(id, &request)
            .await?
            .ok_or_else(|| not_found_error("Log", &id.to_string()))?;
        let invalidated = self.invalidate_log(&log).await;

        Ok(ApiResponse::success_with_message(log, "Log actualizado".to_string()).invalidated(invalidated))
    }

    /// Borrar un log y sus fotos
    pub async fn delete(&self, id: i64) -> AppResult<ApiResponse<TrigLog>> {
        let log = self
            .repository
            .delete_log(id)
            .await?
            .ok_or_else(|| not_found_error("Log", &id.to_string()))?;

        let mut invalidated = self.invalidate_log(&log).await;
        // Las fotos del log desaparecen con él
        invalidated += self
            .invalidator
            .invalidate(ResourceType::Photo, None, &related_ids(&log))
            .await;

        Ok(ApiResponse::success_with_message(log, "Log eliminado".to_string()).invalidated(invalidated))
    }

    async fn invalidate_log(&self, log: &TrigLog) -> u64 {
        self.invalidator
            .invalidate(ResourceType::Log, Some(&log.id.to_string()), &related_ids(log))
            .await
    }
}

fn related_ids(log: &TrigLog) -> RelatedIds {
    RelatedIds::new()
        .with("log_id", log.id)
        .with("trig_id", log.trig_id)
        .with("user_id", log.user_id)
}
