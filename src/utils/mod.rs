//! Utilidades del sistema
//!
//! Manejo de errores y su conversión a respuestas HTTP.

pub mod errors;
