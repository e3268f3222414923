pub mod trig_repository;

pub use trig_repository::{PgTrigRepository, Scope, TrigRepository};
