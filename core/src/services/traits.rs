//! Traits for the ephemeral cache and mail transport collaborators

use async_trait::async_trait;

use crate::domain::entities::OtpPurpose;

/// Fast ephemeral key/value store with per-key expiry
#[async_trait]
pub trait CacheServiceTrait: Send + Sync {
    /// Atomically store `value` only if `key` is absent.
    /// Returns true if this call created the key.
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, String>;
    /// Store a value, replacing any existing one
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String>;
    async fn get(&self, key: &str) -> Result<Option<String>, String>;
    /// Returns true if a key was removed
    async fn delete(&self, key: &str) -> Result<bool, String>;
    async fn exists(&self, key: &str) -> Result<bool, String>;
}

/// Outbound mail transport
#[async_trait]
pub trait MailServiceTrait: Send + Sync {
    /// Deliver a one-time code. Returns the provider's message id.
    async fn send_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<String, String>;
}
