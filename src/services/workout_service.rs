use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::debug;

use crate::models::{validate_create, validate_update, Payload, UserId, Workout, WorkoutId};
use crate::repositories::WorkoutRepository;
use crate::services::WorkoutError;

/// Who may see and change a workout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Only the creating user. Other users' records behave as absent.
    #[default]
    Owner,
    /// Every authenticated user.
    Shared,
}

impl FromStr for OwnershipPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(OwnershipPolicy::Owner),
            "shared" => Ok(OwnershipPolicy::Shared),
            other => Err(anyhow!("unknown ownership policy '{other}', expected 'owner' or 'shared'")),
        }
    }
}

/// CRUD business logic for workouts. Holds no state between calls; the
/// repository is the single source of truth.
#[derive(Clone)]
pub struct WorkoutService {
    repository: Arc<dyn WorkoutRepository>,
    policy: OwnershipPolicy,
}

impl WorkoutService {
    pub fn new(repository: Arc<dyn WorkoutRepository>, policy: OwnershipPolicy) -> Self {
        Self { repository, policy }
    }

    /// Validate `payload` and store it as a new workout owned by `owner`.
    pub async fn create_workout(&self, owner: &UserId, payload: &Payload) -> Result<Workout, WorkoutError> {
        let fields = validate_create(payload)?;
        let workout = Workout::new(*owner, fields);

        self.repository.insert(&workout).await?;

        debug!(workout_id = %workout.id, "workout created");
        Ok(workout)
    }

    /// Workouts visible to `caller`, oldest first.
    pub async fn list_workouts(&self, caller: &UserId) -> Result<Vec<Workout>, WorkoutError> {
        let workouts = match self.policy {
            OwnershipPolicy::Owner => self.repository.find_by_owner(caller).await?,
            OwnershipPolicy::Shared => self.repository.find_all().await?,
        };

        Ok(workouts)
    }

    pub async fn get_workout(&self, caller: &UserId, id: &str) -> Result<Workout, WorkoutError> {
        let id = parse_workout_id(id)?;
        self.find_visible(caller, &id).await
    }

    /// Merge the present fields of `payload` into an existing workout.
    ///
    /// The record must exist before the payload is looked at; a payload that
    /// fails validation never reaches the repository. A payload with no known
    /// fields returns the record as stored.
    pub async fn update_workout(
        &self,
        caller: &UserId,
        id: &str,
        payload: &Payload,
    ) -> Result<Workout, WorkoutError> {
        let id = parse_workout_id(id)?;
        let mut workout = self.find_visible(caller, &id).await?;

        let changes = validate_update(payload)?;
        if changes.is_empty() {
            return Ok(workout);
        }

        workout.apply(changes);

        // Deleted between the lookup and the write
        if !self.repository.update(&workout).await? {
            return Err(WorkoutError::NotFound);
        }

        debug!(workout_id = %workout.id, "workout updated");
        Ok(workout)
    }

    pub async fn delete_workout(&self, caller: &UserId, id: &str) -> Result<(), WorkoutError> {
        let id = parse_workout_id(id)?;
        self.find_visible(caller, &id).await?;

        if !self.repository.delete(&id).await? {
            return Err(WorkoutError::NotFound);
        }

        debug!(workout_id = %id, "workout deleted");
        Ok(())
    }

    async fn find_visible(&self, caller: &UserId, id: &WorkoutId) -> Result<Workout, WorkoutError> {
        let workout = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(WorkoutError::NotFound)?;

        match self.policy {
            OwnershipPolicy::Owner if !workout.is_owned_by(caller) => Err(WorkoutError::NotFound),
            _ => Ok(workout),
        }
    }
}

/// A malformed identifier cannot name a stored record.
fn parse_workout_id(id: &str) -> Result<WorkoutId, WorkoutError> {
    WorkoutId::parse_str(id).map_err(|_| WorkoutError::NotFound)
}
