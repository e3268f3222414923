use std::sync::Arc;

use axum::http::HeaderMap;

use crate::cache::{CacheAside, CacheClient, CacheRequest, Cached, ReadOutcome, ResourceType};
use crate::models::SiteStats;
use crate::repositories::TrigRepository;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub struct StatsController {
    repository: Arc<dyn TrigRepository>,
    cache: CacheClient,
    aside: CacheAside,
}

impl StatsController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repository.clone(),
            cache: state.cache.clone(),
            aside: state.cache_aside(),
        }
    }

    pub async fn site(&self, headers: &HeaderMap) -> AppResult<Cached<SiteStats>> {
        let key = self.cache.key(ResourceType::Stats).sub("site");
        let repository = self.repository.clone();

        self.aside
            .fetch(CacheRequest::new(key).bypass_from(headers), move || async move {
                let stats = repository.site_stats().await?;
                Ok::<_, AppError>(ReadOutcome::Body(stats))
            })
            .await
    }
}
