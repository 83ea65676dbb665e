use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User email
    pub exp: usize,    // Expiration time
    pub iat: usize,    // Issued at
    pub jti: String,   // JWT ID
}

/// Credentials posted to signup and login. Missing fields deserialize as
/// empty strings so the service can report them uniformly.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub email: String,
    pub token: String,
}

/// Authenticated identity attached to every workout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user_id: UserId,
    pub email: String,
    pub jti: String,
}

impl UserSession {
    pub fn from_claims(claims: &Claims) -> Result<Self, crate::models::ObjectIdError> {
        Ok(Self {
            user_id: UserId::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            jti: claims.jti.clone(),
        })
    }
}
