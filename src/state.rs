//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::cache::{CacheAside, CacheClient, CacheInvalidator};
use crate::config::AppConfig;
use crate::repositories::TrigRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<dyn TrigRepository>,
    pub cache: CacheClient,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Arc<dyn TrigRepository>, cache: CacheClient) -> Self {
        Self {
            config,
            repository,
            cache,
        }
    }

    pub fn cache_aside(&self) -> CacheAside {
        CacheAside::new(self.cache.clone())
    }

    pub fn invalidator(&self) -> CacheInvalidator {
        CacheInvalidator::new(self.cache.clone())
    }
}
