use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::Duration;
use tower_http::trace::TraceLayer;

use super::auth::user_routes;
use super::health::health_check;
use super::workouts::workout_routes;
use crate::auth::{cors_layer, security_headers_layer, AuthService, JwtService};
use crate::config::AppConfig;
use crate::repositories::{UserRepository, WorkoutRepository};
use crate::services::WorkoutService;

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub workout_service: WorkoutService,
}

impl AppState {
    pub fn from_repositories(
        users: Arc<dyn UserRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        config: &AppConfig,
    ) -> Self {
        let jwt_service = JwtService::new(
            &config.jwt_secret,
            Duration::hours(config.token_ttl_hours),
        );

        Self {
            auth_service: AuthService::new(users, jwt_service, config.bcrypt_cost),
            workout_service: WorkoutService::new(workouts, config.ownership),
        }
    }
}

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/user", user_routes(state.auth_service.clone()))
        .nest(
            "/api/workouts",
            workout_routes(state.workout_service, state.auth_service),
        )
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer())
}
