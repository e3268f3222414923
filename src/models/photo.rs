//! Modelo de Photo
//!
//! Mapea a la tabla `tphoto`. Cada foto cuelga de un log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Photo {
    pub id: i64,
    pub log_id: i64,
    pub trig_id: i64,
    pub user_id: i64,
    pub caption: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Request para adjuntar una foto a un log
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePhotoRequest {
    #[validate(range(min = 1))]
    pub log_id: i64,

    #[validate(length(max = 200))]
    #[serde(default)]
    pub caption: String,

    #[validate(url)]
    pub url: String,
}
