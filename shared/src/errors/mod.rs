//! Shared error response structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard error response structure used across all API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for client identification
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Additional error details (field errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, serde_json::Value>>,

    /// Timestamp when the error occurred
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    /// Add a detail field to the error response
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(HashMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Error codes returned in the `error` field
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const MISSING_PARAMETERS: &str = "missing_parameters";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const TOKEN_REVOKED: &str = "token_revoked";
    pub const INVALID_REFRESH_TOKEN: &str = "invalid_refresh_token";
    pub const ACCOUNT_BLOCKED: &str = "account_blocked";
    pub const EMAIL_NOT_VERIFIED: &str = "email_not_verified";
    pub const USER_EXISTS: &str = "user_already_exists";
    pub const NOT_FOUND: &str = "not_found";
    pub const OTP_INVALID_OR_EXPIRED: &str = "invalid_or_expired";
    pub const OTP_TOO_MANY_ATTEMPTS: &str = "too_many_attempts";
    pub const CACHE_UNAVAILABLE: &str = "cache_unavailable";
    pub const MAIL_DISPATCH_FAILED: &str = "mail_dispatch_failed";
    pub const HASHING_FAILED: &str = "hashing_failed";
    pub const PERSISTENCE_FAILED: &str = "persistence_failed";
    pub const INTERNAL_ERROR: &str = "internal_error";
}
