//! Configuration module with business-specific sub-modules
//!
//! - `auth` - token signing, refresh cookie, OTP and password hashing settings
//! - `cache` - Redis connection
//! - `database` - MySQL connection pool
//! - `environment` - environment detection and logging
//! - `mail` - mail transport selection and credentials
//! - `server` - HTTP bind address and CORS

pub mod auth;
pub mod cache;
pub mod database;
pub mod environment;
pub mod mail;
pub mod server;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use auth::{AuthConfig, CleanupConfig, CookieConfig, JwtConfig, OtpConfig, PasswordConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use mail::{MailConfig, MailProvider};
pub use server::{CorsConfig, ServerConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub auth: AuthConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            auth: AuthConfig::for_environment(env),
            mail: MailConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Callers are expected to have loaded any `.env` file beforehand
    /// (see [`load_dotenv`]).
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            cache: CacheConfig::from_env(),
            auth: AuthConfig::from_env(environment),
            mail: MailConfig::from_env(),
            cors: CorsConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Reject configurations that must never reach production.
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() {
            if self.auth.jwt.is_using_default_secrets() {
                return Err("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must be set in production".into());
            }
            if !self.auth.cookie.secure {
                return Err("refresh cookie must be secure in production".into());
            }
            if self.mail.provider != MailProvider::Http || self.mail.api_key.is_empty() {
                return Err("MAIL_PROVIDER=http with MAIL_API_KEY is required in production".into());
            }
        }
        if self.auth.jwt.access_secret == self.auth.jwt.refresh_secret {
            return Err("access and refresh tokens must use different secrets".into());
        }
        Ok(())
    }
}

/// Load the `.env` file if one exists. Missing files are not an error.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Read and parse an environment variable, falling back to `default` when the
/// variable is unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a string environment variable with a default.
pub(crate) fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
