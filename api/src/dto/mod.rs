//! Request and response bodies. JSON field names are camelCase.

pub mod auth;
pub mod otp;

pub use auth::{
    AccessTokenResponse, EmployerRegistrationRequest, LoginRequest, MeResponse,
    PasswordResetRequest, RegisterResponse, WorkerRegistrationRequest,
};
pub use otp::{MessageResponse, OtpRequestBody, OtpRequestResponse, OtpVerifyBody};

use uuid::Uuid;

use gb_core::errors::{OtpError, ValidationError};

/// Trimmed value of a required parameter
pub(crate) fn required(value: &Option<String>) -> Result<&str, OtpError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(OtpError::MissingParameters)
}

pub(crate) fn parse_user_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidFormat {
        field: "userId".to_string(),
    })
}
