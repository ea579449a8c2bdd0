//! Credential store interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{Principal, RoleProfile};
use crate::errors::DomainError;

/// Persistence for principals and their role-specific profiles.
///
/// Emails passed in are expected to be normalized already; implementations
/// compare them verbatim.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    /// Atomically insert a principal and its profile.
    ///
    /// # Returns
    /// * `Ok(Principal)` - Both rows committed
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Email taken
    /// * `Err(DomainError)` - Nothing was written
    async fn create_with_profile(
        &self,
        principal: Principal,
        profile: RoleProfile,
    ) -> Result<Principal, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError>;

    /// Set `email_verified` and clear the verification deadline.
    /// Returns false if no such principal exists.
    async fn mark_email_verified(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Administrative block/unblock
    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<bool, DomainError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, DomainError>;

    /// Remove unverified principals whose deadline is at or before `now`,
    /// together with their profiles. Returns the number removed.
    async fn delete_unverified_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
