//! Domain-specific error types for authentication, tokens, OTP and input
//! validation.

use thiserror::Error;

/// Authentication and account-state errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never distinguished
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Account blocked by admin")]
    UserBlocked,

    #[error("Email not verified")]
    EmailNotVerified,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing or malformed authorization header")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Missing refresh token")]
    MissingRefreshToken,

    /// Unknown, expired, revoked or already rotated refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// One-time code errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("Missing required parameters")]
    MissingParameters,

    #[error("Unknown OTP purpose: {purpose}")]
    UnknownPurpose { purpose: String },

    #[error("Email does not belong to this account")]
    EmailMismatch,

    #[error("Invalid or expired OTP")]
    InvalidOrExpired,

    #[error("Too many attempts")]
    TooManyAttempts,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length: {field} (min: {min}, max: {max})")]
    InvalidLength { field: String, min: usize, max: usize },

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },
}

impl ValidationError {
    /// Name of the offending field, surfaced to clients
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::InvalidFormat { field }
            | ValidationError::InvalidLength { field, .. }
            | ValidationError::InvalidField { field, .. } => field,
            ValidationError::InvalidEmail => "email",
        }
    }
}
