//! Trigpoint API
//!
//! API CRUD de pilares geodésicos, logs, fotos y usuarios con un cache de
//! respuestas en Redis invalidado por patrones.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
