//! One-time code entity scoped to a (principal, purpose, email) triple.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use gb_shared::utils::email::normalize_email;

use crate::errors::OtpError;

/// Wrong guesses allowed before the code is destroyed
pub const MAX_ATTEMPTS: u32 = 5;

/// Digits in a generated code
pub const CODE_LENGTH: usize = 6;

/// What a verified code authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpPurpose {
    Login,
    Register,
    EmailChange,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Login => "login",
            OtpPurpose::Register => "register",
            OtpPurpose::EmailChange => "email_change",
            OtpPurpose::PasswordReset => "password_reset",
        }
    }

    /// Successful verification flips the principal's `email_verified` flag
    pub fn verifies_email(&self) -> bool {
        matches!(self, OtpPurpose::Login | OtpPurpose::Register)
    }

    /// The code must be sent to the address already on the account
    pub fn requires_account_email(&self) -> bool {
        !matches!(self, OtpPurpose::EmailChange)
    }
}

impl fmt::Display for OtpPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpPurpose {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(OtpPurpose::Login),
            "register" => Ok(OtpPurpose::Register),
            "email_change" => Ok(OtpPurpose::EmailChange),
            "password_reset" => Ok(OtpPurpose::PasswordReset),
            other => Err(OtpError::UnknownPurpose {
                purpose: other.to_string(),
            }),
        }
    }
}

/// The triple every OTP row, cache entry and cooldown is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OtpKey {
    pub principal_id: Uuid,
    pub purpose: OtpPurpose,
    pub email: String,
}

impl OtpKey {
    pub fn new(principal_id: Uuid, email: &str, purpose: OtpPurpose) -> Self {
        Self {
            principal_id,
            purpose,
            email: normalize_email(email),
        }
    }

    /// Cache key holding the plaintext code for silent resends
    pub fn code_cache_key(&self) -> String {
        format!("otp:code:{}:{}:{}", self.principal_id, self.purpose, self.email)
    }

    /// Cache key marking the resend cooldown window
    pub fn cooldown_cache_key(&self) -> String {
        format!("otp:cooldown:{}:{}:{}", self.principal_id, self.purpose, self.email)
    }
}

/// Persisted one-time code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpToken {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub email: String,
    pub purpose: OtpPurpose,

    /// bcrypt hash of the numeric code
    #[serde(skip_serializing)]
    pub code_hash: String,

    pub consumed: bool,
    pub attempts: u32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OtpToken {
    pub fn new(key: &OtpKey, code_hash: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            principal_id: key.principal_id,
            email: key.email.clone(),
            purpose: key.purpose,
            code_hash,
            consumed: false,
            attempts: 0,
            expires_at: now + ttl,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> OtpKey {
        OtpKey {
            principal_id: self.principal_id,
            purpose: self.purpose,
            email: self.email.clone(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unconsumed and unexpired
    pub fn is_pending_at(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired_at(now)
    }

    pub fn attempts_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }
}
