use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use workout_api::api::{create_routes, AppState};
use workout_api::config::{run_migrations, AppConfig, DatabaseConfig};
use workout_api::repositories::{
    InMemoryUserRepository, InMemoryWorkoutRepository, PostgresUserRepository,
    PostgresWorkoutRepository, UserRepository, WorkoutRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    // RUST_LOG wins over LOG_LEVEL when both are set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (users, workouts): (Arc<dyn UserRepository>, Arc<dyn WorkoutRepository>) =
        match DatabaseConfig::from_env()? {
            Some(database) => {
                let pool = database
                    .create_pool()
                    .await
                    .context("failed to connect to database")?;
                run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;
                info!("Using PostgreSQL storage");
                (
                    Arc::new(PostgresUserRepository::new(pool.clone())),
                    Arc::new(PostgresWorkoutRepository::new(pool)),
                )
            }
            None => {
                info!("DATABASE_URL not set, using in-memory storage");
                (
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemoryWorkoutRepository::new()),
                )
            }
        };

    let state = AppState::from_repositories(users, workouts, &config);
    let app = create_routes(state);

    let address = config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(
        environment = %config.environment,
        ownership = ?config.ownership,
        "Workout API listening on http://{address}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
