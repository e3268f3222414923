//! Modelo de Trig (pilar geodésico)
//!
//! Mapea a la tabla `trig`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Pilar geodésico
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trig {
    pub id: i64,
    pub waypoint: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Código de estado físico (G bueno, D dañado, M desaparecido...)
    pub condition: String,
    pub log_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// Request para actualizar un pilar
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTrigRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(length(equal = 1))]
    pub condition: Option<String>,
}
