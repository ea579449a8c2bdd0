//! Main token service implementation

use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::{
    AccessClaims, ClientMetadata, PrincipalType, RefreshClaims, RefreshSession, RevocationReason,
    TokenPair, VerifiedRefresh,
};
use crate::errors::{DomainError, TokenError};
use crate::repositories::SessionRepository;

use super::config::TokenServiceConfig;

/// Mints and verifies access and refresh tokens and owns the refresh
/// session lifecycle. No other component writes refresh sessions.
pub struct TokenService<S: SessionRepository> {
    sessions: Arc<S>,
    config: TokenServiceConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
}

impl<S: SessionRepository> TokenService<S> {
    pub fn new(sessions: Arc<S>, config: TokenServiceConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Blacklist markers expire exactly at `exp`, so no grace period here
        validation.leeway = 0;

        Self {
            sessions,
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            config,
            validation,
        }
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Signs a short-lived access token with a fresh jti. Nothing is stored.
    pub fn generate_access_token(&self, principal_id: Uuid) -> Result<String, DomainError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: principal_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_token_expiry_seconds)).timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        encode_jwt(&claims, &self.access_encoding)
    }

    /// Signature and expiry check only. Any failure yields `None`.
    pub fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        match decode::<AccessClaims>(token, &self.access_decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "access token rejected");
                None
            }
        }
    }

    /// Signs a refresh token and persists its session. The token is only
    /// returned once the session row exists.
    pub async fn generate_refresh_token(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
        metadata: ClientMetadata,
    ) -> Result<String, DomainError> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.refresh_token_expiry_seconds);
        let claims = RefreshClaims {
            sub: principal_id.to_string(),
            ptype: principal_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode_jwt(&claims, &self.refresh_encoding)?;

        // Store the second-truncated expiry so the row and the token agree
        let session_expiry = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .unwrap_or(expires_at);
        let session = RefreshSession::new(
            principal_id,
            principal_type,
            claims.jti.clone(),
            session_expiry,
            metadata,
        );
        self.sessions.create(session).await?;

        debug!(principal_id = %principal_id, jti = %claims.jti, "refresh session created");
        Ok(token)
    }

    /// Mint an access token and a persisted refresh token together
    pub async fn issue_pair(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
        metadata: ClientMetadata,
    ) -> Result<TokenPair, DomainError> {
        let access_token = self.generate_access_token(principal_id)?;
        let refresh_token = self
            .generate_refresh_token(principal_id, principal_type, metadata)
            .await?;
        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expiry_seconds,
            self.config.refresh_token_expiry_seconds,
        ))
    }

    /// Verify the signature, then require an active session for the jti.
    ///
    /// # Returns
    /// * `Ok(Some(_))` - Token and session are both good
    /// * `Ok(None)` - Bad signature, expired, or the session is missing,
    ///   revoked or expired (replay or already rotated)
    /// * `Err(DomainError)` - The session store failed
    pub async fn verify_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<VerifiedRefresh>, DomainError> {
        let claims = match self.decode_refresh(token) {
            Some(claims) => claims,
            None => return Ok(None),
        };
        let principal_id = match claims.principal_id() {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };

        match self.sessions.find_active(&claims.jti, principal_id).await? {
            Some(session) if session.principal_type == claims.ptype => {
                Ok(Some(VerifiedRefresh { claims, session }))
            }
            _ => {
                debug!(principal_id = %principal_id, jti = %claims.jti, "refresh token has no active session");
                Ok(None)
            }
        }
    }

    /// Rotate-on-use. The old session is revoked with a conditional update
    /// and new tokens are minted only if this caller won that update.
    ///
    /// The new session is created after the revoke, outside any transaction:
    /// a crash between the two leaves the caller with no valid session and
    /// forces a fresh login, which is the accepted failure mode.
    pub async fn rotate(
        &self,
        verified: &VerifiedRefresh,
        metadata: ClientMetadata,
    ) -> Result<TokenPair, DomainError> {
        let session = &verified.session;
        let won = self
            .sessions
            .revoke_if_active(&session.jti, session.principal_id, RevocationReason::Rotated)
            .await?;
        if !won {
            warn!(
                principal_id = %session.principal_id,
                jti = %session.jti,
                "refresh token reused or rotated concurrently"
            );
            return Err(TokenError::InvalidRefreshToken.into());
        }

        let pair = self
            .issue_pair(session.principal_id, session.principal_type, metadata)
            .await?;
        info!(principal_id = %session.principal_id, "refresh token rotated");
        Ok(pair)
    }

    /// Verify and rotate in one step
    pub async fn refresh(&self, token: &str, metadata: ClientMetadata) -> Result<TokenPair, DomainError> {
        let verified = self
            .verify_refresh_token(token)
            .await?
            .ok_or(TokenError::InvalidRefreshToken)?;
        self.rotate(&verified, metadata).await
    }

    /// Revoke exactly the session behind `token`. Invalid or unknown tokens
    /// are not an error; they just report `false`.
    pub async fn revoke_session(
        &self,
        token: &str,
        reason: RevocationReason,
    ) -> Result<bool, DomainError> {
        let claims = match self.decode_refresh(token) {
            Some(claims) => claims,
            None => return Ok(false),
        };
        let principal_id = match claims.principal_id() {
            Ok(id) => id,
            Err(_) => return Ok(false),
        };
        self.sessions
            .revoke_if_active(&claims.jti, principal_id, reason)
            .await
    }

    /// Revoke every active session of a principal
    pub async fn revoke_all(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        let count = self
            .sessions
            .revoke_all_for_principal(principal_id, principal_type, reason)
            .await?;
        info!(principal_id = %principal_id, count, reason = %reason, "revoked all sessions");
        Ok(count)
    }

    /// Physically remove expired sessions
    pub async fn purge_expired_sessions(&self) -> Result<usize, DomainError> {
        self.sessions.delete_expired(Utc::now()).await
    }

    fn decode_refresh(&self, token: &str) -> Option<RefreshClaims> {
        match decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "refresh token rejected");
                None
            }
        }
    }
}

fn encode_jwt<T: Serialize>(claims: &T, key: &EncodingKey) -> Result<String, DomainError> {
    encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
}

/// Sign arbitrary claims, for tests that need hand-crafted timestamps
#[cfg(test)]
pub(crate) fn sign_for_test<T: Serialize>(claims: &T, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
