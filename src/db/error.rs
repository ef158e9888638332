use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Record not found")]
    NotFound,

    /// The write collided with an existing confirmed booking for the same
    /// host. This is the storage-level face of a slot conflict.
    #[error("Conflicting record")]
    Conflict,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
