//! Invalidación de cache tras escrituras
//!
//! Cada mutación (crear, editar o borrar un log, una foto, un usuario o un
//! pilar) purga los patrones de su tipo de recurso con los ids concretos
//! sustituidos. La política es conservadora: se purgan todos los listados en
//! lugar de seguir dependencias exactas.
//!
//! Riesgo conocido: una lectura lenta que empezó antes de la escritura puede
//! volver a guardar el valor viejo después de la invalidación. Ese valor vive
//! como mucho el TTL del recurso.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::client::CacheClient;
use super::metrics::CACHE_INVALIDATED_KEYS;
use super::resources::ResourceType;

/// Ids relacionados con la entidad mutada (`trig_id`, `user_id`, `log_id`...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedIds(BTreeMap<String, String>);

impl RelatedIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, id: impl ToString) -> Self {
        self.0.insert(name.to_string(), id.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Resolver las plantillas de un tipo de recurso.
///
/// Las plantillas con un placeholder sin valor se omiten.
pub fn resolve_patterns(
    resource: ResourceType,
    resource_id: Option<&str>,
    related: &RelatedIds,
) -> Vec<String> {
    resource
        .invalidation_templates()
        .iter()
        .filter_map(|template| {
            let resolved = substitute(template, |name| match name {
                "id" => resource_id,
                other => related.get(other),
            });
            if resolved.is_none() {
                debug!(template = *template, resource = %resource, "⏭️ Plantilla sin ids, omitida");
            }
            resolved
        })
        .collect()
}

fn substitute<'a, F>(template: &str, lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let end = start + rest[start..].find('}')?;
        resolved.push_str(&rest[..start]);
        resolved.push_str(lookup(&rest[start + 1..end])?);
        rest = &rest[end + 1..];
    }
    resolved.push_str(rest);

    Some(resolved)
}

#[derive(Clone)]
pub struct CacheInvalidator {
    cache: CacheClient,
}

impl CacheInvalidator {
    pub fn new(cache: CacheClient) -> Self {
        Self { cache }
    }

    /// Purgar todo lo que pueda depender de la entidad mutada.
    ///
    /// Se llama justo después de confirmar la escritura. Nunca falla: si el
    /// store no responde se registra y la escritura sigue siendo válida.
    pub async fn invalidate(
        &self,
        resource: ResourceType,
        resource_id: Option<&str>,
        related: &RelatedIds,
    ) -> u64 {
        if !self.cache.is_enabled() {
            return 0;
        }

        let patterns = resolve_patterns(resource, resource_id, related);
        let mut deleted = 0;
        for pattern in &patterns {
            deleted += self.cache.delete_pattern(pattern).await;
        }

        CACHE_INVALIDATED_KEYS.inc_by(deleted);
        info!(
            event = "cache_invalidate",
            resource = %resource,
            resource_id = resource_id.unwrap_or("-"),
            patterns = patterns.len(),
            deleted = deleted,
            "🧹 Cache invalidado"
        );

        deleted
    }
}
