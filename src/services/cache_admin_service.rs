//! Servicio de administración del cache
//!
//! A diferencia de las lecturas, aquí los fallos del store se devuelven al
//! operador en lugar de absorberse.

use serde::Serialize;
use tracing::info;

use crate::cache::{CacheClient, CacheStats};
use crate::utils::errors::{bad_request_error, AppResult};

/// Resultado de un vaciado
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlushResult {
    /// `None` cuando se vació el namespace completo
    pub pattern: Option<String>,
    pub deleted: u64,
}

#[derive(Clone)]
pub struct CacheAdminService {
    cache: CacheClient,
}

impl CacheAdminService {
    pub fn new(cache: CacheClient) -> Self {
        Self { cache }
    }

    pub async fn get_stats(&self) -> AppResult<CacheStats> {
        Ok(self.cache.try_stats().await?)
    }

    /// Vaciar las claves que casan con `pattern`, o todo el namespace
    pub async fn flush(&self, pattern: Option<&str>) -> AppResult<FlushResult> {
        let deleted = match pattern {
            Some(pattern) if pattern.trim().is_empty() => {
                return Err(bad_request_error("pattern must not be empty"));
            }
            Some(pattern) => self.cache.try_delete_pattern(pattern).await?,
            None => self.cache.try_flush_all().await?,
        };

        info!(
            event = "cache_flush",
            pattern = pattern.unwrap_or("*"),
            deleted = deleted,
            "🗑️ Cache vaciado por admin"
        );

        Ok(FlushResult {
            pattern: pattern.map(String::from),
            deleted,
        })
    }
}
