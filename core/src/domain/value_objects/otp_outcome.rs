//! OTP request and verification outcomes.
//!
//! A rejected verification is a normal outcome, not an error: callers decide
//! how to present it. Infrastructure failures travel as `DomainError`.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OtpRequestResult {
    /// True when an existing code was reused or the request fell inside the
    /// resend cooldown
    pub resent: bool,
}

/// Why a code was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpRejection {
    /// Wrong, expired, consumed or never issued; deliberately one bucket
    InvalidOrExpired,
    /// Attempt cap reached; the code is gone and a new one must be requested
    TooManyAttempts,
}

impl OtpRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            OtpRejection::InvalidOrExpired => "invalid_or_expired",
            OtpRejection::TooManyAttempts => "too_many_attempts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerification {
    Verified,
    Rejected(OtpRejection),
}

impl OtpVerification {
    pub fn is_verified(&self) -> bool {
        matches!(self, OtpVerification::Verified)
    }
}
