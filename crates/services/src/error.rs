use thiserror::Error;

use crate::dao::base::DaoError;

/// Failure kinds reported by the reservation core. Every variant except
/// `Store` is an expected outcome the caller can act on.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Invitation code has already been used")]
    AlreadyUsed,
    #[error("Invitation code has expired")]
    Expired,
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error(transparent)]
    Store(#[from] DaoError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ServiceError::InvalidInput(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        ServiceError::InvalidOperation(msg.into())
    }

    /// Short machine-readable tag, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::InvalidInput(_) => "invalid_input",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Unavailable(_) => "unavailable",
            ServiceError::AlreadyExists(_) => "already_exists",
            ServiceError::AlreadyUsed => "already_used",
            ServiceError::Expired => "expired",
            ServiceError::InvalidOperation(_) => "invalid_operation",
            ServiceError::Store(_) => "internal",
        }
    }
}
