use chrono::{DateTime, Utc};

use super::workout::now_micros;
use super::UserId;

/// Stored account. Not `Serialize`: the password hash stays server-side.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String) -> Self {
        let now = now_micros();
        Self {
            id: UserId::new(),
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}
