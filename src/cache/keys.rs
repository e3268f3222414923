//! Construcción de claves de cache
//!
//! Formato: `{resource}:{id}:{subresource}:params_{hash}:{version}`. Solo el
//! recurso y la versión son obligatorios; los segmentos ausentes se omiten.
//! Los parámetros se ordenan por nombre antes de calcular el hash, así que el
//! orden de inserción no afecta a la clave.

use std::collections::BTreeMap;

use super::resources::ResourceType;

/// Versión del esquema de claves
pub const DEFAULT_KEY_VERSION: &str = "v1";

/// Caracteres hex del md5 que se conservan en `params_{hash}`
const PARAMS_HASH_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    resource: ResourceType,
    resource_id: Option<String>,
    subresource: Option<String>,
    params: BTreeMap<String, String>,
    version: String,
}

impl CacheKey {
    pub fn new(resource: ResourceType) -> Self {
        Self {
            resource,
            resource_id: None,
            subresource: None,
            params: BTreeMap::new(),
            version: DEFAULT_KEY_VERSION.to_string(),
        }
    }

    pub fn id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn sub(mut self, subresource: &str) -> Self {
        self.subresource = Some(subresource.to_string());
        self
    }

    /// Añadir un parámetro de consulta. Los valores vacíos no cuentan como
    /// parámetro efectivo.
    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        if value.is_empty() {
            self.params.remove(name);
        } else {
            self.params.insert(name.to_string(), value);
        }
        self
    }

    pub fn params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        params
            .into_iter()
            .fold(self, |key, (name, value)| key.param(name.as_ref(), value))
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn build(&self) -> String {
        let mut segments: Vec<String> = Vec::with_capacity(5);
        segments.push(self.resource.prefix().to_string());

        if let Some(id) = &self.resource_id {
            segments.push(id.clone());
        }
        if let Some(sub) = &self.subresource {
            segments.push(sub.clone());
        }
        if let Some(hash) = hash_params(&self.params) {
            segments.push(format!("params_{}", hash));
        }
        segments.push(self.version.clone());

        segments.join(":")
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}

/// Hash corto de los parámetros, `None` si no hay ninguno.
///
/// Cada nombre y valor se codifica con su longitud delante para que ningún
/// valor pueda imitar la frontera entre dos parámetros.
pub fn hash_params(params: &BTreeMap<String, String>) -> Option<String> {
    if params.is_empty() {
        return None;
    }

    let mut context = md5::Context::new();
    for (name, value) in params {
        context.consume(format!("{}:{}={}:{};", name.len(), name, value.len(), value).as_bytes());
    }
    let digest = format!("{:x}", context.compute());

    Some(digest[..PARAMS_HASH_LEN].to_string())
}
