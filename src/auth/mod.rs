// Authentication: password policy, bearer tokens, request guard

pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use errors::*;
pub use jwt::*;
pub use middleware::*;
pub use models::*;
pub use password::*;
pub use service::*;
