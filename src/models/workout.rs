use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{UserId, WorkoutId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: WorkoutId,
    pub title: String,
    pub reps: i64,
    pub load: f64,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by the create operation, all present and valid.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub title: String,
    pub reps: i64,
    pub load: f64,
}

/// Fields accepted by the update operation. `None` leaves the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutChanges {
    pub title: Option<String>,
    pub reps: Option<i64>,
    pub load: Option<f64>,
}

/// Current time at the microsecond precision storage keeps.
pub(crate) fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl Workout {
    pub fn new(owner: UserId, fields: NewWorkout) -> Self {
        let now = now_micros();
        Self {
            id: WorkoutId::new(),
            title: fields.title,
            reps: fields.reps,
            load: fields.load,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }

    /// Merge the present fields into this record and bump `updated_at`.
    /// The identifier and owner never change.
    pub fn apply(&mut self, changes: WorkoutChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(reps) = changes.reps {
            self.reps = reps;
        }
        if let Some(load) = changes.load {
            self.load = load;
        }
        self.updated_at = now_micros();
    }
}

impl WorkoutChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.reps.is_none() && self.load.is_none()
    }
}
