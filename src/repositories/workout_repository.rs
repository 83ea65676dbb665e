use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::models::{UserId, Workout, WorkoutId};
use crate::repositories::RepositoryError;

/// Keyed storage of workout records.
///
/// Listing methods return records in insertion order. `update` and `delete`
/// report whether a record was actually touched, so a caller racing another
/// writer can tell a vanished record from a successful write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    async fn insert(&self, workout: &Workout) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &WorkoutId) -> Result<Option<Workout>, RepositoryError>;

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Workout>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Workout>, RepositoryError>;

    /// Replace the stored fields of `workout`, matched by id.
    async fn update(&self, workout: &Workout) -> Result<bool, RepositoryError>;

    async fn delete(&self, id: &WorkoutId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct WorkoutRow {
    id: String,
    title: String,
    reps: i64,
    load: f64,
    user_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkoutRow> for Workout {
    type Error = RepositoryError;

    fn try_from(row: WorkoutRow) -> Result<Self, Self::Error> {
        let id = WorkoutId::parse_str(&row.id)
            .map_err(|err| RepositoryError::Corrupt(format!("workout id {}: {}", row.id, err)))?;
        let user_id = UserId::parse_str(&row.user_id).map_err(|err| {
            RepositoryError::Corrupt(format!("owner of workout {}: {}", row.id, err))
        })?;

        Ok(Workout {
            id,
            title: row.title,
            reps: row.reps,
            load: row.load,
            user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_workouts(rows: Vec<WorkoutRow>) -> Result<Vec<Workout>, RepositoryError> {
    rows.into_iter().map(Workout::try_from).collect()
}

const SELECT_WORKOUT: &str =
    "SELECT id, title, reps, load, user_id, created_at, updated_at FROM workouts";

/// PostgreSQL-backed workout storage. Insertion order is kept by the
/// `seq` column.
#[derive(Debug, Clone)]
pub struct PostgresWorkoutRepository {
    db: PgPool,
}

impl PostgresWorkoutRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkoutRepository for PostgresWorkoutRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(id = %workout.id))]
    async fn insert(&self, workout: &Workout) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO workouts (id, title, reps, load, user_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(workout.id.to_hex())
        .bind(&workout.title)
        .bind(workout.reps)
        .bind(workout.load)
        .bind(workout.user_id.to_hex())
        .bind(workout.created_at)
        .bind(workout.updated_at)
        .execute(&self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(format!("workout {}", workout.id))
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &WorkoutId) -> Result<Option<Workout>, RepositoryError> {
        let row = sqlx::query_as::<_, WorkoutRow>(&format!("{SELECT_WORKOUT} WHERE id = $1"))
            .bind(id.to_hex())
            .fetch_optional(&self.db)
            .await?;

        row.map(Workout::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%owner))]
    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Workout>, RepositoryError> {
        let rows = sqlx::query_as::<_, WorkoutRow>(&format!(
            "{SELECT_WORKOUT} WHERE user_id = $1 ORDER BY seq ASC"
        ))
        .bind(owner.to_hex())
        .fetch_all(&self.db)
        .await?;

        into_workouts(rows)
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Workout>, RepositoryError> {
        let rows = sqlx::query_as::<_, WorkoutRow>(&format!("{SELECT_WORKOUT} ORDER BY seq ASC"))
            .fetch_all(&self.db)
            .await?;

        into_workouts(rows)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %workout.id))]
    async fn update(&self, workout: &Workout) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE workouts
             SET title = $2, reps = $3, load = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(workout.id.to_hex())
        .bind(&workout.title)
        .bind(workout.reps)
        .bind(workout.load)
        .bind(workout.updated_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: &WorkoutId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id.to_hex())
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Process-local workout storage, used when no database is configured and
/// in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkoutRepository {
    workouts: Arc<RwLock<Vec<Workout>>>,
}

impl InMemoryWorkoutRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkoutRepository for InMemoryWorkoutRepository {
    async fn insert(&self, workout: &Workout) -> Result<(), RepositoryError> {
        let mut workouts = self.workouts.write().await;
        if workouts.iter().any(|existing| existing.id == workout.id) {
            return Err(RepositoryError::Conflict(format!("workout {}", workout.id)));
        }
        workouts.push(workout.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &WorkoutId) -> Result<Option<Workout>, RepositoryError> {
        let workouts = self.workouts.read().await;
        Ok(workouts.iter().find(|workout| workout.id == *id).cloned())
    }

    async fn find_by_owner(&self, owner: &UserId) -> Result<Vec<Workout>, RepositoryError> {
        let workouts = self.workouts.read().await;
        Ok(workouts
            .iter()
            .filter(|workout| workout.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<Workout>, RepositoryError> {
        Ok(self.workouts.read().await.clone())
    }

    async fn update(&self, workout: &Workout) -> Result<bool, RepositoryError> {
        let mut workouts = self.workouts.write().await;
        match workouts.iter_mut().find(|existing| existing.id == workout.id) {
            Some(existing) => {
                existing.title = workout.title.clone();
                existing.reps = workout.reps;
                existing.load = workout.load;
                existing.updated_at = workout.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &WorkoutId) -> Result<bool, RepositoryError> {
        let mut workouts = self.workouts.write().await;
        match workouts.iter().position(|workout| workout.id == *id) {
            Some(index) => {
                workouts.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
