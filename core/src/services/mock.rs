//! In-memory cache and mail collaborators for tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::OtpPurpose;

use super::traits::{CacheServiceTrait, MailServiceTrait};

/// Cache backed by a map with lazily enforced expiry
#[derive(Clone, Default)]
pub struct MockCacheService {
    entries: Arc<RwLock<HashMap<String, (String, DateTime<Utc>)>>>,
    unavailable: Arc<AtomicBool>,
}

impl MockCacheService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the server were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Drop a key as if its TTL had run out
    pub async fn expire(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Remaining lifetime of a live key
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Utc::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(_, expires_at)| *expires_at - now)
    }

    fn check(&self) -> Result<(), String> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err("connection refused".to_string())
        } else {
            Ok(())
        }
    }

    fn deadline(ttl_seconds: u64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(ttl_seconds as i64)
    }
}

#[async_trait]
impl CacheServiceTrait for MockCacheService {
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, String> {
        self.check()?;
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        if let Some((_, expires_at)) = entries.get(key) {
            if *expires_at > now {
                return Ok(false);
            }
        }
        entries.insert(key.to_string(), (value.to_string(), Self::deadline(ttl_seconds)));
        Ok(true)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), Self::deadline(ttl_seconds)));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.check()?;
        let now = Utc::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        self.check()?;
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        Ok(self.get(key).await?.is_some())
    }
}

/// A message captured by [`MockMailService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub email: String,
    pub code: String,
    pub purpose: OtpPurpose,
}

/// Mail transport that records instead of sending
#[derive(Clone, Default)]
pub struct MockMailService {
    sent: Arc<RwLock<Vec<SentMail>>>,
    counter: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
}

impl MockMailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failure(&self, fail: bool) {
        self.simulate_failure.store(fail, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.read().await.clone()
    }

    /// Most recent code delivered to `email` for `purpose`
    pub async fn last_code(&self, email: &str, purpose: OtpPurpose) -> Option<String> {
        self.sent
            .read()
            .await
            .iter()
            .rev()
            .find(|m| m.email == email && m.purpose == purpose)
            .map(|m| m.code.clone())
    }
}

#[async_trait]
impl MailServiceTrait for MockMailService {
    async fn send_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<String, String> {
        if self.simulate_failure.load(Ordering::SeqCst) {
            return Err("mail provider rejected the message".to_string());
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent.write().await.push(SentMail {
            email: email.to_string(),
            code: code.to_string(),
            purpose,
        });
        Ok(format!("mock-mail-{}", n))
    }
}
