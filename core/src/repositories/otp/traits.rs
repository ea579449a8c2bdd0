//! OTP store interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{OtpKey, OtpToken};
use crate::errors::DomainError;

/// Persistence for one-time codes. At most one unconsumed row exists per
/// [`OtpKey`].
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Insert `token`, or overwrite the hash, attempts and expiry of the
    /// existing unconsumed row for the same key. Returns the stored row.
    async fn upsert_pending(&self, token: OtpToken) -> Result<OtpToken, DomainError>;

    /// Unconsumed and unexpired row for the key
    async fn find_pending(&self, key: &OtpKey) -> Result<Option<OtpToken>, DomainError>;

    /// Atomically bump the attempt counter of an unconsumed row.
    ///
    /// # Returns
    /// * `Ok(Some(n))` - The counter after this increment
    /// * `Ok(None)` - Row missing or already consumed
    async fn increment_attempts(&self, id: Uuid) -> Result<Option<u32>, DomainError>;

    /// Conditional `consumed: false -> true`. True only for the caller that
    /// performed the transition.
    async fn mark_consumed(&self, id: Uuid) -> Result<bool, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Remove rows whose expiry is at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
