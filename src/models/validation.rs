use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{NewWorkout, WorkoutChanges};

/// Raw request body of a create or update call.
pub type Payload = Map<String, Value>;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
});

/// Which rule set a workout payload is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every field is required.
    Create,
    /// Every field is optional; present fields are still checked.
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field-level failures of one payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid fields: {}", join_fields(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.errors.iter().map(|error| error.field).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }
}

/// Check a workout payload against the rules of `mode`.
///
/// Unknown fields are ignored. `null` counts as present, and is rejected for
/// every known field. Failures are collected for all fields rather than
/// stopping at the first.
pub fn validate(payload: &Payload, mode: ValidationMode) -> Result<WorkoutChanges, ValidationErrors> {
    let mut errors = Vec::new();

    let changes = WorkoutChanges {
        title: check_field(payload, "title", mode, parse_title, &mut errors),
        reps: check_field(payload, "reps", mode, parse_reps, &mut errors),
        load: check_field(payload, "load", mode, parse_load, &mut errors),
    };

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(ValidationErrors { errors })
    }
}

/// Validate a create payload into a complete [`NewWorkout`].
pub fn validate_create(payload: &Payload) -> Result<NewWorkout, ValidationErrors> {
    let changes = validate(payload, ValidationMode::Create)?;

    match (changes.title, changes.reps, changes.load) {
        (Some(title), Some(reps), Some(load)) => Ok(NewWorkout { title, reps, load }),
        _ => Err(ValidationErrors::single("body", "missing required fields")),
    }
}

/// Validate an update payload. An empty result is not an error here.
pub fn validate_update(payload: &Payload) -> Result<WorkoutChanges, ValidationErrors> {
    validate(payload, ValidationMode::Update)
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| error.field)
        .collect::<Vec<_>>()
        .join(", ")
}

fn check_field<T>(
    payload: &Payload,
    field: &'static str,
    mode: ValidationMode,
    parse: fn(&Value) -> Result<T, String>,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    match payload.get(field) {
        None => {
            if mode == ValidationMode::Create {
                errors.push(FieldError::new(field, "is required"));
            }
            None
        }
        Some(value) => match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.push(FieldError::new(field, message));
                None
            }
        },
    }
}

fn parse_title(value: &Value) -> Result<String, String> {
    match value {
        Value::String(title) if title.trim().is_empty() => Err("must not be empty".to_string()),
        Value::String(title) => Ok(title.clone()),
        _ => Err("must be a string".to_string()),
    }
}

fn parse_reps(value: &Value) -> Result<i64, String> {
    let reps = match value {
        Value::Number(number) => {
            if let Some(reps) = number.as_i64() {
                reps
            } else if number.is_u64() {
                return Err("is out of range".to_string());
            } else {
                match number.as_f64() {
                    Some(float)
                        if float.fract() == 0.0
                            && float >= i64::MIN as f64
                            && float <= i64::MAX as f64 =>
                    {
                        float as i64
                    }
                    _ => return Err("must be an integer".to_string()),
                }
            }
        }
        _ => return Err("must be an integer".to_string()),
    };

    if reps < 0 {
        return Err("must be zero or greater".to_string());
    }

    Ok(reps)
}

fn parse_load(value: &Value) -> Result<f64, String> {
    match value.as_f64() {
        Some(load) if load.is_finite() => Ok(load),
        _ => Err("must be a number".to_string()),
    }
}

/// Email validation
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(anyhow!("Email cannot be empty"));
    }

    if email.len() > 255 {
        return Err(anyhow!("Email cannot be longer than 255 characters"));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(anyhow!("Invalid email format"));
    }

    Ok(())
}
