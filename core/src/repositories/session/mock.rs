//! In-memory SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{PrincipalType, RefreshSession, RevocationReason};
use crate::errors::DomainError;

use super::traits::SessionRepository;

/// Sessions keyed by jti. Every conditional update happens under the write
/// lock, which gives the same single-winner behaviour as the SQL version.
#[derive(Clone, Default)]
pub struct MockSessionRepository {
    sessions: Arc<RwLock<HashMap<String, RefreshSession>>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a session regardless of state
    pub async fn get(&self, jti: &str) -> Option<RefreshSession> {
        self.sessions.read().await.get(jti).cloned()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Backdate a session so it reads as expired
    pub async fn expire(&self, jti: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(jti) {
            session.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn create(&self, session: RefreshSession) -> Result<RefreshSession, DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.jti) {
            return Err(DomainError::Persistence {
                message: "duplicate session jti".to_string(),
            });
        }
        sessions.insert(session.jti.clone(), session.clone());
        Ok(session)
    }

    async fn find_active(
        &self,
        jti: &str,
        principal_id: Uuid,
    ) -> Result<Option<RefreshSession>, DomainError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .get(jti)
            .filter(|s| s.principal_id == principal_id && s.is_active_at(now))
            .cloned())
    }

    async fn revoke_if_active(
        &self,
        jti: &str,
        principal_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(jti) {
            Some(session) if session.principal_id == principal_id && session.is_active_at(now) => {
                session.revoke(reason, now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_principal(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let mut count = 0;
        for session in sessions.values_mut() {
            if session.principal_id == principal_id
                && session.principal_type == principal_type
                && session.is_active_at(now)
            {
                session.revoke(reason, now);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
    ) -> Result<Vec<RefreshSession>, DomainError> {
        let now = Utc::now();
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| {
                s.principal_id == principal_id
                    && s.principal_type == principal_type
                    && s.is_active_at(now)
            })
            .cloned()
            .collect())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok(before - sessions.len())
    }
}
