//! Request authentication gates.
//!
//! Two checks run in order on protected routes: the bearer token must be
//! well formed, correctly signed, unexpired and not blacklisted; then the
//! principal it names must still exist and must not be blocked.

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::Principal;
use crate::errors::{AuthError, DomainResult, TokenError};
use crate::repositories::{PrincipalRepository, SessionRepository};

use super::revocation::RevocationService;
use super::token::TokenService;
use super::traits::CacheServiceTrait;

/// Token part of an `Authorization: Bearer <token>` value. The scheme is
/// matched case-insensitively.
pub fn bearer_credentials(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

/// What the first gate establishes about a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedToken {
    pub principal_id: Uuid,
    pub jti: String,
    /// Expiry of the access token, unix seconds
    pub exp: i64,
}

pub struct SessionGuard<S, P, C>
where
    S: SessionRepository,
    P: PrincipalRepository,
    C: CacheServiceTrait,
{
    tokens: Arc<TokenService<S>>,
    revocation: Arc<RevocationService<C>>,
    principals: Arc<P>,
}

impl<S, P, C> SessionGuard<S, P, C>
where
    S: SessionRepository,
    P: PrincipalRepository,
    C: CacheServiceTrait,
{
    pub fn new(
        tokens: Arc<TokenService<S>>,
        revocation: Arc<RevocationService<C>>,
        principals: Arc<P>,
    ) -> Self {
        Self {
            tokens,
            revocation,
            principals,
        }
    }

    /// First gate. `header` is the raw `Authorization` value, if any.
    pub async fn authenticate_bearer(&self, header: Option<&str>) -> DomainResult<AuthenticatedToken> {
        let token = header
            .and_then(bearer_credentials)
            .ok_or(TokenError::MissingToken)?;

        let claims = self
            .tokens
            .verify_access_token(token)
            .ok_or(TokenError::InvalidToken)?;
        let principal_id = claims.principal_id().map_err(|_| TokenError::InvalidToken)?;

        if self.revocation.is_access_jti_blacklisted(&claims.jti).await? {
            debug!(principal_id = %principal_id, jti = %claims.jti, "blacklisted access token presented");
            return Err(TokenError::TokenRevoked.into());
        }

        Ok(AuthenticatedToken {
            principal_id,
            jti: claims.jti,
            exp: claims.exp,
        })
    }

    /// Second gate
    pub async fn load_active_principal(&self, principal_id: Uuid) -> DomainResult<Principal> {
        let principal = self
            .principals
            .find_by_id(principal_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if principal.is_blocked {
            return Err(AuthError::UserBlocked.into());
        }
        Ok(principal)
    }

    /// Both gates in order
    pub async fn authenticate(&self, header: Option<&str>) -> DomainResult<(AuthenticatedToken, Principal)> {
        let token = self.authenticate_bearer(header).await?;
        let principal = self.load_active_principal(token.principal_id).await?;
        Ok((token, principal))
    }
}
