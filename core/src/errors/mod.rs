//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, OtpError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors
///
/// Domain-level failures are grouped in the bridged enums; the remaining
/// variants describe a dependent store or service that failed, each kept
/// distinct so the HTTP layer can give them different statuses.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Mail dispatch failed: {message}")]
    MailDispatch { message: String },

    #[error("Hashing failed: {message}")]
    Hashing { message: String },

    #[error("Persistence failed: {message}")]
    Persistence { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        DomainError::Persistence {
            message: err.to_string(),
        }
    }

    pub fn cache(err: impl std::fmt::Display) -> Self {
        DomainError::CacheUnavailable {
            message: err.to_string(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridged_errors_are_transparent() {
        let err: DomainError = AuthError::InvalidCredentials.into();
        assert_eq!(err.to_string(), "Invalid email or password");

        let err: DomainError = OtpError::TooManyAttempts.into();
        assert_eq!(err.to_string(), "Too many attempts");
    }

    #[test]
    fn test_infrastructure_helpers() {
        assert!(matches!(
            DomainError::persistence("deadlock"),
            DomainError::Persistence { message } if message == "deadlock"
        ));
        assert!(matches!(DomainError::cache("refused"), DomainError::CacheUnavailable { .. }));
    }
}
