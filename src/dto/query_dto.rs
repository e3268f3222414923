//! Parámetros de consulta de los listados
//!
//! Los parámetros efectivos (con defaults aplicados) son los que entran en la
//! clave de cache, así `?page=1` y sin parámetros comparten entrada.

use serde::Deserialize;

pub const DEFAULT_PER_PAGE: u32 = 50;
pub const MAX_PER_PAGE: u32 = 200;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub condition: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.per_page() as i64
    }

    pub fn condition(&self) -> Option<String> {
        self.condition
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
    }

    /// Parámetros que identifican la respuesta en el cache
    pub fn cache_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page().to_string()),
            ("per_page", self.per_page().to_string()),
        ];
        if let Some(condition) = self.condition() {
            params.push(("condition", condition));
        }
        params
    }
}
