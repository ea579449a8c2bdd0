//! Refresh session store interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{PrincipalType, RefreshSession, RevocationReason};
use crate::errors::DomainError;

/// Persistence for refresh sessions. Sessions are revoked, never deleted,
/// until the expiry sweep removes them.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    ///
    /// # Returns
    /// * `Ok(RefreshSession)` - Row committed; the token may now be handed out
    /// * `Err(DomainError)` - Duplicate jti or storage failure
    async fn create(&self, session: RefreshSession) -> Result<RefreshSession, DomainError>;

    /// Load the session for `jti` owned by `principal_id`, only if it is
    /// neither revoked nor expired.
    async fn find_active(
        &self,
        jti: &str,
        principal_id: Uuid,
    ) -> Result<Option<RefreshSession>, DomainError>;

    /// Conditional `revoked: false -> true` on an unexpired session.
    ///
    /// # Returns
    /// * `Ok(true)` - This call performed the transition
    /// * `Ok(false)` - Already revoked, expired or missing; the caller lost
    async fn revoke_if_active(
        &self,
        jti: &str,
        principal_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError>;

    /// Revoke every active session for the principal. Returns how many
    /// transitioned.
    async fn revoke_all_for_principal(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
        reason: RevocationReason,
    ) -> Result<usize, DomainError>;

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
    ) -> Result<Vec<RefreshSession>, DomainError>;

    /// Physically remove sessions whose expiry is at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
