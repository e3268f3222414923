//! Modelo de Log (visita registrada a un pilar)
//!
//! Mapea a la tabla `tlog`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrigLog {
    pub id: i64,
    pub trig_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub condition: String,
    pub comment: String,
    pub score: i16,
    pub created_at: DateTime<Utc>,
}

/// Request para registrar una visita
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLogRequest {
    #[validate(range(min = 1))]
    pub trig_id: i64,

    #[validate(range(min = 1))]
    pub user_id: i64,

    #[validate(length(equal = 1))]
    pub condition: String,

    #[validate(length(max = 4000))]
    #[serde(default)]
    pub comment: String,

    #[validate(range(min = 0, max = 10))]
    #[serde(default)]
    pub score: i16,
}

/// Request para editar una visita
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLogRequest {
    #[validate(length(equal = 1))]
    pub condition: Option<String>,

    #[validate(length(max = 4000))]
    pub comment: Option<String>,

    #[validate(range(min = 0, max = 10))]
    pub score: Option<i16>,
}
