//! Cache module for Redis-based caching
//!
//! Holds OTP codes, resend cooldowns and the access-token blacklist. All of
//! them rely on per-key expiry rather than explicit cleanup.

pub mod redis_cache_service;
pub mod redis_client;

pub use redis_cache_service::RedisCacheService;
pub use redis_client::RedisClient;

// Re-export commonly used types
pub use gb_shared::config::CacheConfig;
