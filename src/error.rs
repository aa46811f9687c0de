//! Typed service errors and their wire codes.
//!
//! Query and service functions fail fast with the first violated
//! precondition; handlers translate the variant into the error envelope
//! code. Database errors are wrapped rather than stringified so the
//! handler layer can log the source while returning a stable code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl WorkerError {
    /// Wire error code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            WorkerError::NotFound(_) => "NOT_FOUND",
            WorkerError::Conflict(_) => "CONFLICT",
            WorkerError::Validation(_) => "VALIDATION_ERROR",
            WorkerError::Unauthorized(_) => "UNAUTHORIZED",
            WorkerError::Forbidden(_) => "FORBIDDEN",
            WorkerError::Database(_) => "DATABASE_ERROR",
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        WorkerError::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        WorkerError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        WorkerError::Validation(msg.into())
    }
}

pub type WorkerResult<T> = Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_map_to_taxonomy() {
        assert_eq!(WorkerError::not_found("zone").code(), "NOT_FOUND");
        assert_eq!(WorkerError::conflict("dup").code(), "CONFLICT");
        assert_eq!(WorkerError::validation("bad").code(), "VALIDATION_ERROR");
        assert_eq!(
            WorkerError::Unauthorized("no token".into()).code(),
            "UNAUTHORIZED"
        );
        assert_eq!(WorkerError::Forbidden("nope".into()).code(), "FORBIDDEN");
    }

    #[test]
    fn test_database_error_wraps_sqlx() {
        let err: WorkerError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}
