//! In-memory PrincipalRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Principal, RoleProfile};
use crate::errors::{AuthError, DomainError};

use super::traits::PrincipalRepository;

#[derive(Clone, Default)]
pub struct MockPrincipalRepository {
    principals: Arc<RwLock<HashMap<Uuid, (Principal, RoleProfile)>>>,
}

impl MockPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn profile_of(&self, id: Uuid) -> Option<RoleProfile> {
        self.principals.read().await.get(&id).map(|(_, p)| p.clone())
    }

    pub async fn count(&self) -> usize {
        self.principals.read().await.len()
    }
}

#[async_trait]
impl PrincipalRepository for MockPrincipalRepository {
    async fn create_with_profile(
        &self,
        principal: Principal,
        profile: RoleProfile,
    ) -> Result<Principal, DomainError> {
        let mut principals = self.principals.write().await;
        if principals.values().any(|(p, _)| p.email == principal.email) {
            return Err(AuthError::UserAlreadyExists.into());
        }
        principals.insert(principal.id, (principal.clone(), profile));
        Ok(principal)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, DomainError> {
        Ok(self.principals.read().await.get(&id).map(|(p, _)| p.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        Ok(self
            .principals
            .read()
            .await
            .values()
            .find(|(p, _)| p.email == email)
            .map(|(p, _)| p.clone()))
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut principals = self.principals.write().await;
        match principals.get_mut(&id) {
            Some((principal, _)) => {
                principal.mark_email_verified();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<bool, DomainError> {
        let mut principals = self.principals.write().await;
        match principals.get_mut(&id) {
            Some((principal, _)) => {
                principal.is_blocked = blocked;
                principal.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<bool, DomainError> {
        let mut principals = self.principals.write().await;
        match principals.get_mut(&id) {
            Some((principal, _)) => {
                principal.password_hash = password_hash.to_string();
                principal.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_unverified_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut principals = self.principals.write().await;
        let before = principals.len();
        principals.retain(|_, (p, _)| !p.is_verification_expired_at(now));
        Ok(before - principals.len())
    }
}
