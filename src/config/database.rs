use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

use super::app::parse_or;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    /// Returns `None` when `DATABASE_URL` is unset, meaning the service
    /// should run on in-memory storage.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(database_url) = lookup("DATABASE_URL").filter(|url| !url.is_empty()) else {
            return Ok(None);
        };

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?;
        let connect_timeout_secs = parse_or(&lookup, "DB_CONNECT_TIMEOUT", 30)?;

        Ok(Some(DatabaseConfig {
            database_url,
            max_connections,
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        }))
    }

    pub async fn create_pool(&self) -> Result<PgPool> {
        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect(&self.database_url)
            .await?;

        Ok(pool)
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
