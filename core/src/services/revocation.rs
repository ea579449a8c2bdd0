//! Access-token blacklist.
//!
//! Access tokens are stateless, so killing one before it expires needs a
//! marker in the ephemeral cache. Each marker lives exactly as long as the
//! token it shadows.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

use crate::errors::{DomainError, DomainResult};

use super::traits::CacheServiceTrait;

pub struct RevocationService<C: CacheServiceTrait> {
    cache: Arc<C>,
}

impl<C: CacheServiceTrait> RevocationService<C> {
    pub fn new(cache: Arc<C>) -> Self {
        Self { cache }
    }

    pub fn blacklist_key(jti: &str) -> String {
        format!("blacklist:access:{}", jti)
    }

    /// Mark an access token's jti as revoked until `exp` (unix seconds).
    /// Returns false without writing anything if the token has already
    /// expired on its own.
    pub async fn blacklist_access_jti(&self, jti: &str, exp: i64) -> DomainResult<bool> {
        let ttl = exp - Utc::now().timestamp();
        if ttl <= 0 {
            debug!(jti = %jti, "access token already expired; nothing to blacklist");
            return Ok(false);
        }

        self.cache
            .set_with_expiry(&Self::blacklist_key(jti), "1", ttl as u64)
            .await
            .map_err(|e| {
                error!(error = %e, jti = %jti, "failed to blacklist access token");
                DomainError::cache(e)
            })?;
        debug!(jti = %jti, ttl, "access token blacklisted");
        Ok(true)
    }

    /// Fails closed: an unreachable cache is an error, never "not revoked"
    pub async fn is_access_jti_blacklisted(&self, jti: &str) -> DomainResult<bool> {
        self.cache
            .exists(&Self::blacklist_key(jti))
            .await
            .map_err(DomainError::cache)
    }
}
