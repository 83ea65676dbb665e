// Data models and payload validation

pub mod object_id;
pub mod user;
pub mod validation;
pub mod workout;

pub use object_id::*;
pub use user::*;
pub use validation::*;
pub use workout::*;
