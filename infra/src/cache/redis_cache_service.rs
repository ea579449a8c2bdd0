//! Redis-backed implementation of the cache trait used by the OTP and
//! revocation services.

use async_trait::async_trait;

use gb_core::services::CacheServiceTrait;
use gb_shared::config::CacheConfig;

use super::redis_client::RedisClient;

/// Applies the configured key prefix and flattens errors to strings
pub struct RedisCacheService {
    client: RedisClient,
    config: CacheConfig,
}

impl RedisCacheService {
    pub fn new(client: RedisClient) -> Self {
        let config = client.config().clone();
        Self { client, config }
    }

    pub fn client(&self) -> &RedisClient {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }
}

#[async_trait]
impl CacheServiceTrait for RedisCacheService {
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<bool, String> {
        self.client
            .set_nx_with_expiry(&self.key(key), value, ttl_seconds)
            .await
            .map_err(|e| e.to_string())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), String> {
        self.client
            .set_with_expiry(&self.key(key), value, ttl_seconds.max(1))
            .await
            .map_err(|e| e.to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, String> {
        self.client.get(&self.key(key)).await.map_err(|e| e.to_string())
    }

    async fn delete(&self, key: &str) -> Result<bool, String> {
        self.client.delete(&self.key(key)).await.map_err(|e| e.to_string())
    }

    async fn exists(&self, key: &str) -> Result<bool, String> {
        self.client.exists(&self.key(key)).await.map_err(|e| e.to_string())
    }
}
