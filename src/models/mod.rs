//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema PostgreSQL
//! y las requests de escritura asociadas.

pub mod log;
pub mod photo;
pub mod stats;
pub mod trig;
pub mod user;

pub use log::{CreateLogRequest, TrigLog, UpdateLogRequest};
pub use photo::{CreatePhotoRequest, Photo};
pub use stats::SiteStats;
pub use trig::{Trig, UpdateTrigRequest};
pub use user::{UpdateUserRequest, User};
