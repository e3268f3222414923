//! Controladores
//!
//! Un controlador por recurso. Las lecturas pasan por `CacheAside` y las
//! escrituras invalidan el cache justo después de confirmar en base de datos.

pub mod log_controller;
pub mod photo_controller;
pub mod stats_controller;
pub mod trig_controller;
pub mod user_controller;

pub use log_controller::LogController;
pub use photo_controller::PhotoController;
pub use stats_controller::StatsController;
pub use trig_controller::TrigController;
pub use user_controller::UserController;
