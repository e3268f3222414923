//! Cache-aside para lecturas
//!
//! `CacheAside::fetch` envuelve una lectura: consulta el cache con la clave
//! derivada, sirve el acierto o ejecuta la lectura y guarda el resultado con
//! el TTL del recurso. El resultado lleva siempre los metadatos del cache
//! (estado, clave, TTL y edad) que acaban como cabeceras `X-Cache-*`.
//!
//! No hay coalescencia de peticiones: varios misses concurrentes sobre la
//! misma clave ejecutan la lectura cada uno y escriben el mismo valor.

use std::future::Future;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::client::CacheClient;
use super::keys::CacheKey;
use super::metrics::{CACHE_BYPASS, CACHE_HITS, CACHE_MISSES};

pub const X_CACHE: &str = "x-cache";
pub const X_CACHE_KEY: &str = "x-cache-key";
pub const X_CACHE_TTL: &str = "x-cache-ttl";
pub const X_CACHE_AGE: &str = "x-cache-age";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

/// Metadatos de cache de una respuesta
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheMeta {
    pub status: CacheStatus,
    pub key: String,
    /// Segundos de vida restantes (solo en HIT)
    pub ttl_remaining: Option<u64>,
    /// Segundos desde que se guardó (solo en HIT)
    pub age: Option<u64>,
}

impl CacheMeta {
    fn new(status: CacheStatus, key: String) -> Self {
        Self {
            status,
            key,
            ttl_remaining: None,
            age: None,
        }
    }

    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(X_CACHE, HeaderValue::from_static(self.status.as_str()));
        if let Ok(value) = HeaderValue::from_str(&self.key) {
            headers.insert(X_CACHE_KEY, value);
        }
        if let Some(ttl) = self.ttl_remaining {
            headers.insert(X_CACHE_TTL, HeaderValue::from(ttl));
        }
        if let Some(age) = self.age {
            headers.insert(X_CACHE_AGE, HeaderValue::from(age));
        }
    }
}

/// Forma del resultado de una lectura
pub enum ReadOutcome<T> {
    /// Cuerpo serializable, candidato a cache
    Body(T),
    /// Cuerpo en streaming: nunca se cachea
    Stream {
        content_type: &'static str,
        body: Body,
    },
}

impl<T> ReadOutcome<T> {
    pub fn into_body(self) -> Option<T> {
        match self {
            ReadOutcome::Body(body) => Some(body),
            ReadOutcome::Stream { .. } => None,
        }
    }
}

/// Resultado envuelto con sus metadatos de cache
pub struct Cached<T> {
    pub outcome: ReadOutcome<T>,
    pub meta: CacheMeta,
}

impl<T: Serialize> IntoResponse for Cached<T> {
    fn into_response(self) -> Response {
        let mut response = match self.outcome {
            ReadOutcome::Body(body) => Json(body).into_response(),
            ReadOutcome::Stream { content_type, body } => {
                ([(header::CONTENT_TYPE, content_type)], body).into_response()
            }
        };
        self.meta.apply_headers(response.headers_mut());
        response
    }
}

/// Petición de lectura cacheable
#[derive(Debug, Clone)]
pub struct CacheRequest {
    key: CacheKey,
    ttl_seconds: u64,
    bypass: bool,
}

impl CacheRequest {
    /// TTL por defecto del tipo de recurso de la clave
    pub fn new(key: CacheKey) -> Self {
        let ttl_seconds = key.resource().default_ttl();
        Self {
            key,
            ttl_seconds,
            bypass: false,
        }
    }

    pub fn ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    /// Aplicar la directiva de bypass de las cabeceras de la petición
    pub fn bypass_from(self, headers: &HeaderMap) -> Self {
        self.bypass(wants_bypass(headers))
    }
}

/// `Cache-Control: no-cache|no-store` o `Pragma: no-cache`
pub fn wants_bypass(headers: &HeaderMap) -> bool {
    let has_directive = |name: header::HeaderName, directives: &[&str]| {
        headers.get_all(name).iter().any(|value| {
            value.to_str().map_or(false, |raw| {
                raw.split(',')
                    .map(|d| d.trim().to_ascii_lowercase())
                    .any(|d| directives.contains(&d.as_str()))
            })
        })
    };

    has_directive(header::CACHE_CONTROL, &["no-cache", "no-store"])
        || has_directive(header::PRAGMA, &["no-cache"])
}

#[derive(Clone)]
pub struct CacheAside {
    cache: CacheClient,
}

impl CacheAside {
    pub fn new(cache: CacheClient) -> Self {
        Self { cache }
    }

    /// Ejecutar `load` a través del cache.
    ///
    /// Los errores de `load` se devuelven tal cual y no se cachean. Ningún
    /// fallo del cache llega al llamador.
    pub async fn fetch<T, E, F, Fut>(&self, request: CacheRequest, load: F) -> Result<Cached<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ReadOutcome<T>, E>>,
    {
        let key = request.key.build();

        if request.bypass {
            CACHE_BYPASS.inc();
            debug!(event = "cache_bypass", key = %key, "⏭️ Cache BYPASS");
            let outcome = load().await?;
            return Ok(Cached {
                outcome,
                meta: CacheMeta::new(CacheStatus::Bypass, key),
            });
        }

        if let Some(hit) = self.cache.get(&key).await {
            match serde_json::from_str::<T>(&hit.value) {
                Ok(body) => {
                    CACHE_HITS.inc();
                    let ttl_remaining = self.cache.ttl(&key).await;
                    return Ok(Cached {
                        outcome: ReadOutcome::Body(body),
                        meta: CacheMeta {
                            status: CacheStatus::Hit,
                            key,
                            ttl_remaining,
                            age: Some(hit.age_seconds),
                        },
                    });
                }
                Err(e) => {
                    // Forma antigua o corrupta: se descarta y se recalcula
                    warn!(event = "cache_decode_error", key = %key, error = %e, "⚠️ Valor cacheado ilegible");
                    self.cache.delete(&key).await;
                }
            }
        }

        CACHE_MISSES.inc();
        let outcome = load().await?;

        match &outcome {
            ReadOutcome::Stream { .. } => {
                debug!(event = "cache_skip", key = %key, "⏭️ Respuesta en streaming, no se cachea");
            }
            ReadOutcome::Body(body) => match serde_json::to_string(body) {
                Ok(serialized) => {
                    if self.cache.set(&key, &serialized, request.ttl_seconds).await {
                        debug!(
                            event = "cache_miss_stored",
                            key = %key,
                            ttl = request.ttl_seconds,
                            "💾 Cache MISS almacenado"
                        );
                    }
                }
                Err(e) => {
                    warn!(event = "cache_store_error", key = %key, error = %e, "⚠️ No se pudo serializar el resultado");
                }
            },
        }

        Ok(Cached {
            outcome,
            meta: CacheMeta::new(CacheStatus::Miss, key),
        })
    }
}
