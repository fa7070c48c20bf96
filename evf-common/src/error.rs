//! Common error types for Eventfinder
//!
//! The four request-facing kinds map one-to-one onto HTTP statuses at the
//! server boundary: `Validation` → 400, `NotFound` → 404, `Conflict` → 409,
//! `Persistence` → 500.

use thiserror::Error;

/// Common result type for Eventfinder operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Eventfinder crates
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed required input
    #[error("{0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Unique-key violation the upsert path did not absorb
    #[error("{0}")]
    Conflict(String),

    /// Store unreachable or operation failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Error::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("Duplicate key: {}", db_err.message()))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Error::Validation("Referenced venue or organizer does not exist".to_string())
            }
            _ => Error::Persistence(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_bare() {
        let err = Error::validation("slug is required");
        assert_eq!(err.to_string(), "slug is required");
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_pool_timeout_maps_to_persistence() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, Error::Persistence(_)));
    }
}
