use thiserror::Error;

/// Storage-layer failure surfaced by the routine and execution repositories.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("No database backend is configured")]
    NotConfigured,

    /// The routine or execution does not exist, is not owned by the caller,
    /// or is in the wrong lifecycle state for the operation.
    #[error("Record not found")]
    NotFound,

    /// A uniqueness rule was hit, e.g. a second execution on the same date.
    #[error("Duplicate record: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[cfg(any(feature = "database-sqlite", feature = "database-postgres"))]
    #[error("Schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The `schedule` column could not be encoded or decoded.
    #[error("Malformed routine schedule: {0}")]
    Schedule(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type DbResult<T> = Result<T, DbError>;
