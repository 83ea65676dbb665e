// Storage behind async traits: PostgreSQL and in-memory backends

pub mod errors;
pub mod user_repository;
pub mod workout_repository;

pub use errors::*;
pub use user_repository::*;
pub use workout_repository::*;
