//! Configuration for the OTP service

use gb_shared::config::OtpConfig;

use crate::domain::entities::{CODE_LENGTH, MAX_ATTEMPTS};

#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Lifetime of a code, in the store and in the cache
    pub ttl_seconds: i64,
    /// Window in which repeated requests are swallowed
    pub resend_cooldown_seconds: u64,
    /// Wrong guesses allowed before the row is destroyed
    pub max_attempts: u32,
    pub code_length: usize,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600,
            resend_cooldown_seconds: 30,
            max_attempts: MAX_ATTEMPTS,
            code_length: CODE_LENGTH,
        }
    }
}

impl From<&OtpConfig> for OtpServiceConfig {
    fn from(otp: &OtpConfig) -> Self {
        Self {
            ttl_seconds: otp.ttl_seconds,
            resend_cooldown_seconds: otp.resend_cooldown_seconds,
            max_attempts: otp.max_attempts.max(1),
            code_length: (otp.code_length as usize).clamp(4, 9),
        }
    }
}
