//! Shared utilities and common types for the Gigboard server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The JSON error envelope returned by every endpoint
//! - Email normalization and masking helpers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, CleanupConfig, CookieConfig, CorsConfig, DatabaseConfig,
    Environment, JwtConfig, LogFormat, LoggingConfig, MailConfig, MailProvider, OtpConfig,
    PasswordConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::HealthResponse;
pub use utils::email;
