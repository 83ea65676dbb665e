// Business logic services

pub mod errors;
pub mod workout_service;

pub use errors::WorkoutError;
pub use workout_service::{OwnershipPolicy, WorkoutService};
