//! Registro de tipos de recurso cacheables
//!
//! Cada tipo tiene un prefijo de clave, un TTL por defecto y, si es una
//! entidad mutable, la lista de patrones que hay que purgar cuando cambia.
//! La tabla es estática: no hay registro dinámico.

use serde::Serialize;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Trig,
    Trigs,
    User,
    Log,
    Logs,
    Photo,
    Photos,
    Stats,
}

impl ResourceType {
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Trig,
        ResourceType::Trigs,
        ResourceType::User,
        ResourceType::Log,
        ResourceType::Logs,
        ResourceType::Photo,
        ResourceType::Photos,
        ResourceType::Stats,
    ];

    /// Primer segmento de la clave
    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceType::Trig => "trig",
            ResourceType::Trigs => "trigs",
            ResourceType::User => "user",
            ResourceType::Log => "log",
            ResourceType::Logs => "logs",
            ResourceType::Photo => "photo",
            ResourceType::Photos => "photos",
            ResourceType::Stats => "stats",
        }
    }

    /// TTL por defecto en segundos
    pub fn default_ttl(&self) -> u64 {
        match self {
            // Los datos de un pilar casi no cambian
            ResourceType::Trig => 24 * HOUR,
            ResourceType::Trigs => HOUR,
            ResourceType::User => 10 * MINUTE,
            ResourceType::Log => HOUR,
            ResourceType::Logs => 5 * MINUTE,
            ResourceType::Photo => HOUR,
            ResourceType::Photos => 5 * MINUTE,
            ResourceType::Stats => HOUR,
        }
    }

    /// Plantillas de invalidación para una mutación de esta entidad.
    ///
    /// `{id}` es el id de la entidad mutada; el resto de placeholders se
    /// resuelven con los ids relacionados. El orden se respeta al purgar.
    ///
    /// Algunos patrones (`photo:{id}:*`, `photos:list:*`, `users:list:*`) no
    /// tienen lectura que los pueble hoy. Se mantienen: purgar de más solo
    /// cuesta un SCAN, y una lectura nueva queda cubierta desde el primer día.
    pub fn invalidation_templates(&self) -> &'static [&'static str] {
        match self {
            ResourceType::Log => &[
                "log:{id}:*",
                "logs:list:*",
                "trig:{trig_id}:*",
                "user:{user_id}:*",
                "trigs:list:*",
                "stats:site:*",
            ],
            ResourceType::Photo => &[
                "photo:{id}:*",
                "photos:list:*",
                "log:{log_id}:*",
                "trig:{trig_id}:*",
                "user:{user_id}:*",
                "stats:site:*",
            ],
            // Los listados embeben el nombre del usuario
            ResourceType::User => &[
                "user:{id}:*",
                "users:list:*",
                "logs:list:*",
                "photos:list:*",
                "trig:*:logs:*",
                "trig:*:photos:*",
                "stats:site:*",
            ],
            ResourceType::Trig => &["trig:{id}:*", "trigs:list:*", "stats:site:*"],
            ResourceType::Trigs
            | ResourceType::Logs
            | ResourceType::Photos
            | ResourceType::Stats => &[],
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}
