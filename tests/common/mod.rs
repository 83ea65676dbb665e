#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use workout_api::api::{create_routes, AppState};
use workout_api::config::AppConfig;
use workout_api::repositories::{InMemoryUserRepository, InMemoryWorkoutRepository};
use workout_api::services::OwnershipPolicy;

pub const PASSWORD: &str = "Str0ng!Passw0rd";

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Router over fresh in-memory repositories
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(OwnershipPolicy::Owner)
    }

    pub fn with_policy(ownership: OwnershipPolicy) -> Self {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            jwt_secret: "test_secret_key_for_testing_only".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
            ownership,
        };

        let state = AppState::from_repositories(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryWorkoutRepository::new()),
            &config,
        );

        Self {
            router: create_routes(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sign up a fresh account and return its token
    pub async fn signup(&self, email: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/user/signup",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;

        assert_eq!(response.status, StatusCode::OK, "signup failed: {}", response.body);
        response.body["token"].as_str().unwrap().to_string()
    }

    pub async fn create_workout(&self, token: &str, body: Value) -> Value {
        let response = self
            .request(Method::POST, "/api/workouts", Some(token), Some(body))
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "create failed: {}", response.body);
        response.body
    }
}
