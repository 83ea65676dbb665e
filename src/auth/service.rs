use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::{
    extract_bearer_token, AuthError, AuthResponse, CredentialsRequest, JwtService,
    PasswordPolicy, UserSession,
};
use crate::models::{validate_email, User};
use crate::repositories::{RepositoryError, UserRepository};

/// Issues and verifies bearer tokens for user accounts.
#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    users: Arc<dyn UserRepository>,
    password_policy: PasswordPolicy,
    bcrypt_cost: u32,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwt_service", &self.jwt_service)
            .field("password_policy", &self.password_policy)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_service: JwtService, bcrypt_cost: u32) -> Self {
        Self {
            jwt_service,
            users,
            password_policy: PasswordPolicy::default(),
            bcrypt_cost,
        }
    }

    /// Register a new user and return a token for it
    pub async fn signup(&self, request: CredentialsRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        validate_email(&email).map_err(|err| AuthError::EmailValidation(err.to_string()))?;
        validate_password_strength(&request.password, &self.password_policy)
            .map_err(AuthError::PasswordValidation)?;

        // Check if user already exists
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = self.hash(request.password).await?;
        let user = User::new(email, password_hash);

        // A concurrent signup may have claimed the email since the check above
        self.users.insert(&user).await.map_err(|err| match err {
            RepositoryError::Conflict(_) => AuthError::EmailAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        info!(user_id = %user.id, "user signed up");
        self.issue_token(&user)
    }

    /// Login user
    pub async fn login(&self, request: CredentialsRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify(request.password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user logged in");
        self.issue_token(&user)
    }

    /// Resolve a raw `Authorization` header value to an authenticated session.
    ///
    /// The token must be well formed, correctly signed, unexpired, and
    /// belong to a user that still exists.
    pub async fn authenticate(&self, auth_header: Option<&str>) -> Result<UserSession, AuthError> {
        let auth_header = auth_header.ok_or(AuthError::MissingAuthHeader)?;
        let token = extract_bearer_token(auth_header)?;
        let session = self.jwt_service.extract_user_session(token)?;

        if self.users.find_by_id(&session.user_id).await?.is_none() {
            warn!(user_id = %session.user_id, "token presented for unknown user");
            return Err(AuthError::InvalidToken);
        }

        Ok(session)
    }

    fn issue_token(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self.jwt_service.create_token(user.id, &user.email)?;
        Ok(AuthResponse {
            email: user.email.clone(),
            token,
        })
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|err| AuthError::Internal(anyhow!("password hashing task failed: {err}")))?
            .map_err(AuthError::PasswordHashing)
    }

    async fn verify(&self, password: String, password_hash: String) -> Result<bool, AuthError> {
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|err| AuthError::Internal(anyhow!("password verification task failed: {err}")))?
            .map_err(AuthError::PasswordHashing)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryUserRepository;
    use assert_matches::assert_matches;
    use chrono::Duration;

    const PASSWORD: &str = "R3g5T7#gh";

    fn auth_service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            JwtService::new("test_secret", Duration::hours(1)),
            4,
        )
    }

    fn credentials(email: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_returns_usable_token() {
        let service = auth_service();
        let response = service
            .signup(credentials("mattiv@matti.fi", PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.email, "mattiv@matti.fi");

        let header = format!("bearer {}", response.token);
        let session = service.authenticate(Some(&header)).await.unwrap();
        assert_eq!(session.email, "mattiv@matti.fi");
    }

    #[tokio::test]
    async fn test_signup_normalizes_email() {
        let service = auth_service();
        let response = service
            .signup(credentials("  Matti@Example.COM ", PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.email, "matti@example.com");
    }

    #[tokio::test]
    async fn test_signup_rejects_bad_input() {
        let service = auth_service();

        assert_matches!(
            service.signup(credentials("", PASSWORD)).await,
            Err(AuthError::MissingFields)
        );
        assert_matches!(
            service.signup(credentials("not-an-email", PASSWORD)).await,
            Err(AuthError::EmailValidation(_))
        );
        assert_matches!(
            service.signup(credentials("weak@example.com", "password")).await,
            Err(AuthError::PasswordValidation(_))
        );
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let service = auth_service();
        service
            .signup(credentials("dup@example.com", PASSWORD))
            .await
            .unwrap();

        assert_matches!(
            service.signup(credentials("DUP@example.com", PASSWORD)).await,
            Err(AuthError::EmailAlreadyExists)
        );
    }

    #[tokio::test]
    async fn test_login() {
        let service = auth_service();
        service
            .signup(credentials("login@example.com", PASSWORD))
            .await
            .unwrap();

        let response = service
            .login(credentials("login@example.com", PASSWORD))
            .await
            .unwrap();
        assert_eq!(response.email, "login@example.com");

        assert_matches!(
            service.login(credentials("login@example.com", "Wr0ng#pass")).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_matches!(
            service.login(credentials("nobody@example.com", PASSWORD)).await,
            Err(AuthError::InvalidCredentials)
        );
        assert_matches!(
            service.login(credentials("login@example.com", "")).await,
            Err(AuthError::MissingFields)
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_bad_headers() {
        let service = auth_service();

        assert_matches!(service.authenticate(None).await, Err(AuthError::MissingAuthHeader));
        assert_matches!(
            service.authenticate(Some("Token abc")).await,
            Err(AuthError::InvalidAuthHeaderFormat)
        );
        assert_matches!(
            service.authenticate(Some("bearer not.a.jwt")).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn test_authenticate_rejects_token_of_unknown_user() {
        let service = auth_service();
        let token = JwtService::new("test_secret", Duration::hours(1))
            .create_token(crate::models::UserId::new(), "ghost@example.com")
            .unwrap();

        assert_matches!(
            service.authenticate(Some(&format!("Bearer {token}"))).await,
            Err(AuthError::InvalidToken)
        );
    }
}
