use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::models::{Payload, Workout};
use crate::services::{WorkoutError, WorkoutService};

/// Workout routes, mounted under `/api/workouts`. Every route requires a
/// bearer token.
pub fn workout_routes(workout_service: WorkoutService, auth_service: AuthService) -> Router {
    Router::new()
        .route("/", get(list_workouts).post(create_workout))
        .route(
            "/:id",
            get(get_workout)
                .put(update_workout)
                .patch(update_workout)
                .delete(delete_workout),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(workout_service)
}

#[tracing::instrument(skip_all)]
async fn list_workouts(
    State(service): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<Vec<Workout>>, WorkoutError> {
    let workouts = service.list_workouts(&session.user_id).await?;
    Ok(Json(workouts))
}

#[tracing::instrument(skip_all)]
async fn create_workout(
    State(service): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(payload), _): WithRejection<Json<Payload>, WorkoutError>,
) -> Result<(StatusCode, Json<Workout>), WorkoutError> {
    let workout = service.create_workout(&session.user_id, &payload).await?;
    tracing::info!(user_id = %session.user_id, workout_id = %workout.id, "created workout");
    Ok((StatusCode::CREATED, Json(workout)))
}

#[tracing::instrument(skip_all)]
async fn get_workout(
    State(service): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): WithRejection<Path<String>, WorkoutError>,
) -> Result<Json<Workout>, WorkoutError> {
    let workout = service.get_workout(&session.user_id, &id).await?;
    Ok(Json(workout))
}

#[tracing::instrument(skip_all)]
async fn update_workout(
    State(service): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): WithRejection<Path<String>, WorkoutError>,
    WithRejection(Json(payload), _): WithRejection<Json<Payload>, WorkoutError>,
) -> Result<Json<Workout>, WorkoutError> {
    let workout = service.update_workout(&session.user_id, &id, &payload).await?;
    Ok(Json(workout))
}

#[tracing::instrument(skip_all)]
async fn delete_workout(
    State(service): State<WorkoutService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(id), _): WithRejection<Path<String>, WorkoutError>,
) -> Result<StatusCode, WorkoutError> {
    service.delete_workout(&session.user_id, &id).await?;
    tracing::info!(user_id = %session.user_id, workout_id = %id, "deleted workout");
    Ok(StatusCode::NO_CONTENT)
}
