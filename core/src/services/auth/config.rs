//! Configuration for the authentication service

use chrono::Duration;

use gb_shared::config::PasswordConfig;

#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// How long a new account may stay unverified
    pub verification_grace: Duration,
    pub min_password_length: usize,
    /// bcrypt ignores everything past 72 bytes
    pub max_password_length: usize,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            verification_grace: Duration::hours(24),
            min_password_length: 8,
            max_password_length: 72,
        }
    }
}

impl From<&PasswordConfig> for AuthServiceConfig {
    fn from(password: &PasswordConfig) -> Self {
        Self {
            verification_grace: Duration::hours(password.verification_grace_hours.max(1)),
            ..Self::default()
        }
    }
}
