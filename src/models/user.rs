//! Modelo de User
//!
//! Perfil público. La identidad la gestiona el proveedor externo.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub homepage: Option<String>,
    pub about: String,
    pub log_count: i64,
    pub photo_count: i64,
}

/// Request para actualizar un perfil
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,

    #[validate(url)]
    pub homepage: Option<String>,

    #[validate(length(max = 2000))]
    pub about: Option<String>,
}
