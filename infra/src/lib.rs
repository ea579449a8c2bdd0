//! # Infrastructure Layer
//!
//! Concrete implementations of the gb_core repository and collaborator
//! traits:
//! - **Database**: MySQL repositories for principals, refresh sessions and
//!   one-time codes using SQLx, plus the schema migrations
//! - **Cache**: Redis client and the ephemeral cache adapter
//! - **Mail**: HTTP mail API transport and a logging transport

/// Database module - MySQL implementations using SQLx
pub mod database;

/// Cache module - Redis client and operations
pub mod cache;

/// Mail module - outbound OTP delivery
pub mod mail;

pub use cache::{RedisCacheService, RedisClient};
pub use database::{
    DatabasePool, MySqlOtpRepository, MySqlPrincipalRepository, MySqlSessionRepository,
};
pub use mail::{HttpMailService, LogMailService, MailTransport};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failure
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail provider rejected or failed a delivery
    #[error("Mail service error: {0}")]
    Mail(String),
}
