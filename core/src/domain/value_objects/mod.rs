//! Value objects describing service outcomes.

pub mod auth_response;
pub mod otp_outcome;

pub use auth_response::{LoginResult, LogoutResult, RegistrationResult};
pub use otp_outcome::{OtpRejection, OtpRequestResult, OtpVerification};
