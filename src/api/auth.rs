use axum::{extract::State, response::Json, routing::post, Router};
use axum_extra::extract::WithRejection;

use crate::auth::{AuthError, AuthResponse, AuthService, CredentialsRequest};

/// Account routes, mounted under `/api/user`
pub fn user_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(auth_service)
}

/// Register a new account and return a token for it
#[tracing::instrument(skip(auth_service, request))]
async fn signup(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<CredentialsRequest>, AuthError>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.signup(request).await?;
    Ok(Json(response))
}

/// Exchange credentials for a fresh token
#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<CredentialsRequest>, AuthError>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}
