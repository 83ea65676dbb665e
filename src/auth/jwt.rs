use anyhow::anyhow;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, UserSession};
use crate::models::UserId;

/// JWT token service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("token_expires_in", &self.token_expires_in)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given secret and token lifetime
    pub fn new(secret: &str, token_expires_in: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expires_in,
        }
    }

    /// Create a bearer token for a user
    pub fn create_token(&self, user_id: UserId, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.token_expires_in)
            .ok_or_else(|| AuthError::Internal(anyhow!("token lifetime overflows the clock")))?;

        let claims = Claims {
            sub: user_id.to_hex(),
            email: email.to_string(),
            exp: exp.timestamp().max(0) as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Extract user session from token
    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.validate_token(token)?;
        UserSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }
}

/// Extract bearer token from authorization header. The scheme is matched
/// case-insensitively, so both `Bearer` and `bearer` are accepted.
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = auth_header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeaderFormat)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeaderFormat);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn jwt_service() -> JwtService {
        JwtService::new("test_secret", Duration::hours(72))
    }

    #[test]
    fn test_jwt_creation_and_validation() {
        let jwt_service = jwt_service();
        let user_id = UserId::new();
        let email = "test@example.com";

        let token = jwt_service.create_token(user_id, email).unwrap();
        let claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_hex());
        assert_eq!(claims.email, email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(extract_bearer_token("Bearer test_token").unwrap(), "test_token");
        assert_eq!(extract_bearer_token("bearer test_token").unwrap(), "test_token");
        assert_eq!(extract_bearer_token("BEARER  test_token ").unwrap(), "test_token");

        assert!(extract_bearer_token("Invalid header").is_err());
        assert!(extract_bearer_token("Bearer ").is_err());
        assert!(extract_bearer_token("Basic dXNlcjpwYXNz").is_err());
        assert!(extract_bearer_token("").is_err());
    }

    #[test]
    fn test_user_session_extraction() {
        let jwt_service = jwt_service();
        let user_id = UserId::new();

        let token = jwt_service.create_token(user_id, "coach@example.com").unwrap();
        let session = jwt_service.extract_user_session(&token).unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(session.email, "coach@example.com");
        assert!(!session.jti.is_empty());
    }

    #[test]
    fn test_tokens_have_distinct_ids() {
        let jwt_service = jwt_service();
        let user_id = UserId::new();

        let first = jwt_service.create_token(user_id, "a@example.com").unwrap();
        let second = jwt_service.create_token(user_id, "a@example.com").unwrap();

        let first = jwt_service.extract_user_session(&first).unwrap();
        let second = jwt_service.extract_user_session(&second).unwrap();
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_oversized_lifetime_is_an_error() {
        let jwt_service = JwtService::new("test_secret", Duration::MAX);

        assert_matches!(
            jwt_service.create_token(UserId::new(), "a@example.com"),
            Err(AuthError::Internal(_))
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60 second validation leeway.
        let jwt_service = JwtService::new("test_secret", Duration::minutes(-5));
        let token = jwt_service.create_token(UserId::new(), "a@example.com").unwrap();

        assert_matches!(jwt_service.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new("other_secret", Duration::hours(1));
        let token = other.create_token(UserId::new(), "a@example.com").unwrap();

        assert_matches!(jwt_service().validate_token(&token), Err(AuthError::InvalidToken));
        assert_matches!(jwt_service().validate_token("garbage"), Err(AuthError::InvalidToken));
    }
}
