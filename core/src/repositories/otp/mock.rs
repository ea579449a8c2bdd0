//! In-memory OtpRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{OtpKey, OtpToken};
use crate::errors::DomainError;

use super::traits::OtpRepository;

#[derive(Clone, Default)]
pub struct MockOtpRepository {
    tokens: Arc<RwLock<HashMap<Uuid, OtpToken>>>,
    writes: Arc<AtomicUsize>,
}

impl MockOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `upsert_pending` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub async fn get(&self, id: Uuid) -> Option<OtpToken> {
        self.tokens.read().await.get(&id).cloned()
    }

    /// Row for the key in any state
    pub async fn find_any(&self, key: &OtpKey) -> Option<OtpToken> {
        self.tokens
            .read()
            .await
            .values()
            .find(|t| t.key() == *key)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Backdate a row so it reads as expired
    pub async fn expire(&self, id: Uuid) {
        if let Some(token) = self.tokens.write().await.get_mut(&id) {
            token.expires_at = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

#[async_trait]
impl OtpRepository for MockOtpRepository {
    async fn upsert_pending(&self, token: OtpToken) -> Result<OtpToken, DomainError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut tokens = self.tokens.write().await;
        let key = token.key();
        if let Some(existing) = tokens
            .values_mut()
            .find(|t| !t.consumed && t.key() == key)
        {
            existing.code_hash = token.code_hash;
            existing.attempts = 0;
            existing.expires_at = token.expires_at;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_pending(&self, key: &OtpKey) -> Result<Option<OtpToken>, DomainError> {
        let now = Utc::now();
        Ok(self
            .tokens
            .read()
            .await
            .values()
            .find(|t| t.key() == *key && t.is_pending_at(now))
            .cloned())
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<Option<u32>, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&id) {
            Some(token) if !token.consumed => {
                token.attempts += 1;
                token.updated_at = Utc::now();
                Ok(Some(token.attempts))
            }
            _ => Ok(None),
        }
    }

    async fn mark_consumed(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&id) {
            Some(token) if !token.consumed => {
                token.consumed = true;
                token.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.tokens.write().await.remove(&id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        Ok(before - tokens.len())
    }
}
