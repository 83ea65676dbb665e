use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record already exists: {0}")]
    Conflict(String),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}
