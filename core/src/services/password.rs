//! bcrypt hashing for passwords and one-time codes.
//!
//! bcrypt is CPU-bound, so every hash and verify runs on the blocking pool
//! instead of stalling the async workers.

use once_cell::sync::OnceCell;
use tracing::error;

use crate::errors::DomainError;

const DUMMY_PASSWORD: &str = "gigboard-timing-equalizer";

pub struct PasswordService {
    cost: u32,
    dummy_hash: OnceCell<String>,
}

impl PasswordService {
    /// `cost` is the bcrypt work factor (4..=31)
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, plain: &str) -> Result<String, DomainError> {
        let plain = plain.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| DomainError::Hashing {
                message: e.to_string(),
            })?
            .map_err(|e| {
                error!(error = %e, "bcrypt hash failed");
                DomainError::Hashing {
                    message: e.to_string(),
                }
            })
    }

    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, DomainError> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| DomainError::Hashing {
                message: e.to_string(),
            })?
            .map_err(|e| {
                error!(error = %e, "bcrypt verify failed");
                DomainError::Hashing {
                    message: e.to_string(),
                }
            })
    }

    /// Spend one verification's worth of time against a throwaway hash, so
    /// a login for an unknown email costs the same as a wrong password.
    pub async fn verify_dummy(&self, plain: &str) {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash.clone(),
            None => match self.hash(DUMMY_PASSWORD).await {
                Ok(hash) => self.dummy_hash.get_or_init(|| hash).clone(),
                Err(_) => return,
            },
        };
        let _ = self.verify(plain, &hash).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let service = PasswordService::new(4);
        let hash = service.hash("correct horse").await.unwrap();
        assert_ne!(hash, "correct horse");
        assert!(service.verify("correct horse", &hash).await.unwrap());
        assert!(!service.verify("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let service = PasswordService::new(4);
        let a = service.hash("123456").await.unwrap();
        let b = service.hash("123456").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_hashing_error() {
        let service = PasswordService::new(4);
        let result = service.verify("x", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(DomainError::Hashing { .. })));
    }

    #[tokio::test]
    async fn test_verify_dummy_does_not_panic() {
        let service = PasswordService::new(4);
        service.verify_dummy("anything").await;
        service.verify_dummy("anything").await;
        assert!(service.dummy_hash.get().is_some());
    }
}
