/// Unified error types for the WaiEdu data layer
use crate::db::models::UserRole;
use thiserror::Error;

/// Main error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Referenced entity does not exist
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Referenced user exists but holds the wrong role
    #[error("{entity}: user {user_id} has role '{actual}', expected '{expected}'")]
    RoleMismatch {
        entity: &'static str,
        user_id: i64,
        expected: UserRole,
        actual: UserRole,
    },

    /// Uniqueness invariant violated (e.g., duplicate email)
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Numeric or domain invariant violated
    #[error("Out of range: {0}")]
    DomainRange(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DataError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether the error is recoverable by the caller (a rule violation)
    /// rather than a store-level failure.
    pub fn is_constraint_violation(&self) -> bool {
        !matches!(self, DataError::Database(_) | DataError::Io(_))
    }
}

/// Result type alias for data layer operations
pub type DataResult<T> = Result<T, DataError>;
