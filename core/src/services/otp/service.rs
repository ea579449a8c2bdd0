//! Main OTP service implementation

use chrono::Duration;
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use gb_shared::utils::email::mask_email;

use crate::domain::entities::{OtpKey, OtpPurpose, OtpToken};
use crate::domain::value_objects::{OtpRejection, OtpRequestResult, OtpVerification};
use crate::errors::{DomainError, DomainResult, OtpError};
use crate::repositories::{OtpRepository, PrincipalRepository};
use crate::services::password::PasswordService;
use crate::services::traits::{CacheServiceTrait, MailServiceTrait};

use super::config::OtpServiceConfig;

/// One-time code issuance and verification
pub struct OtpService<O, P, C, M>
where
    O: OtpRepository,
    P: PrincipalRepository,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    otps: Arc<O>,
    principals: Arc<P>,
    cache: Arc<C>,
    mail: Arc<M>,
    passwords: Arc<PasswordService>,
    config: OtpServiceConfig,
}

impl<O, P, C, M> OtpService<O, P, C, M>
where
    O: OtpRepository,
    P: PrincipalRepository,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    pub fn new(
        otps: Arc<O>,
        principals: Arc<P>,
        cache: Arc<C>,
        mail: Arc<M>,
        passwords: Arc<PasswordService>,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            otps,
            principals,
            cache,
            mail,
            passwords,
            config,
        }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Issue a code, or silently reuse the current one.
    ///
    /// 1. A request inside the cooldown window does nothing and reports
    ///    `resent: true`.
    /// 2. A code still cached for the triple is mailed again unchanged.
    /// 3. Otherwise a fresh code is hashed, upserted over any pending row,
    ///    cached for the same TTL and mailed.
    ///
    /// # Returns
    /// * `Ok(OtpRequestResult)` - `resent` tells cases 1 and 2 apart from 3
    /// * `Err(DomainError::Otp(OtpError::MissingParameters))` - Empty email
    /// * `Err(DomainError::NotFound)` - Unknown principal
    /// * `Err(DomainError::Otp(OtpError::EmailMismatch))` - Address is not the account's
    /// * `Err(DomainError::CacheUnavailable)` / `Hashing` / `Persistence` / `MailDispatch`
    pub async fn request_otp(
        &self,
        principal_id: Uuid,
        email: &str,
        purpose: OtpPurpose,
    ) -> DomainResult<OtpRequestResult> {
        if email.trim().is_empty() {
            return Err(OtpError::MissingParameters.into());
        }

        let principal = self
            .principals
            .find_by_id(principal_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: "principal".to_string(),
            })?;
        if purpose.requires_account_email() && !principal.owns_email(email) {
            return Err(OtpError::EmailMismatch.into());
        }

        let key = OtpKey::new(principal_id, email, purpose);

        let acquired = self
            .cache
            .set_if_absent(
                &key.cooldown_cache_key(),
                "1",
                self.config.resend_cooldown_seconds,
            )
            .await
            .map_err(DomainError::cache)?;
        if !acquired {
            debug!(principal_id = %principal_id, purpose = %purpose, "otp request inside cooldown");
            return Ok(OtpRequestResult { resent: true });
        }

        let cached = self
            .cache
            .get(&key.code_cache_key())
            .await
            .map_err(DomainError::cache)?;
        if let Some(code) = cached {
            self.dispatch(&key, &code).await?;
            info!(principal_id = %principal_id, purpose = %purpose, "otp resent");
            return Ok(OtpRequestResult { resent: true });
        }

        let code = match self.store_new_code(&key).await {
            Ok(code) => code,
            Err(e) => {
                // Nothing was issued, so do not make the caller wait out the window
                self.release_cooldown(&key).await;
                return Err(e);
            }
        };
        self.dispatch(&key, &code).await?;

        info!(
            principal_id = %principal_id,
            purpose = %purpose,
            email = %mask_email(&key.email),
            "otp issued"
        );
        Ok(OtpRequestResult { resent: false })
    }

    /// Check a submitted code.
    ///
    /// Wrong, expired and already-consumed codes are indistinguishable to the
    /// caller. The attempt that reaches the cap destroys the code.
    pub async fn verify_otp(
        &self,
        principal_id: Uuid,
        email: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> DomainResult<OtpVerification> {
        if email.trim().is_empty() || code.trim().is_empty() {
            return Err(OtpError::MissingParameters.into());
        }

        let key = OtpKey::new(principal_id, email, purpose);
        let token = match self.otps.find_pending(&key).await? {
            Some(token) => token,
            None => return Ok(OtpVerification::Rejected(OtpRejection::InvalidOrExpired)),
        };

        if token.attempts_exhausted(self.config.max_attempts) {
            self.destroy(&token).await?;
            return Ok(OtpVerification::Rejected(OtpRejection::TooManyAttempts));
        }

        if !self.code_matches(code.trim(), &token).await? {
            return match self.otps.increment_attempts(token.id).await? {
                Some(attempts) if attempts >= self.config.max_attempts => {
                    warn!(principal_id = %principal_id, purpose = %purpose, "otp attempt cap reached");
                    self.destroy(&token).await?;
                    Ok(OtpVerification::Rejected(OtpRejection::TooManyAttempts))
                }
                _ => Ok(OtpVerification::Rejected(OtpRejection::InvalidOrExpired)),
            };
        }

        // Only the caller that flips the flag gets to apply the side effect
        if !self.otps.mark_consumed(token.id).await? {
            debug!(principal_id = %principal_id, "otp consumed concurrently");
            return Ok(OtpVerification::Rejected(OtpRejection::InvalidOrExpired));
        }

        if purpose.verifies_email() && !self.principals.mark_email_verified(principal_id).await? {
            warn!(principal_id = %principal_id, "verified otp for a principal that no longer exists");
        }

        if let Err(e) = self.cache.delete(&key.code_cache_key()).await {
            warn!(error = %e, "failed to drop cached otp code");
        }

        info!(principal_id = %principal_id, purpose = %purpose, "otp verified");
        Ok(OtpVerification::Verified)
    }

    /// Uniform random code of the configured length from the OS RNG
    pub fn generate_code(&self) -> String {
        let upper = 10u32.pow(self.config.code_length as u32);
        let value = OsRng.gen_range(0..upper);
        format!("{:0width$}", value, width = self.config.code_length)
    }

    async fn store_new_code(&self, key: &OtpKey) -> DomainResult<String> {
        let code = self.generate_code();
        let code_hash = self.passwords.hash(&code).await?;

        let token = OtpToken::new(key, code_hash, Duration::seconds(self.config.ttl_seconds));
        self.otps.upsert_pending(token).await?;

        self.cache
            .set_with_expiry(&key.code_cache_key(), &code, self.config.ttl_seconds.max(1) as u64)
            .await
            .map_err(DomainError::cache)?;

        Ok(code)
    }

    async fn dispatch(&self, key: &OtpKey, code: &str) -> DomainResult<()> {
        self.mail
            .send_otp(&key.email, code, key.purpose)
            .await
            .map(|message_id| debug!(message_id = %message_id, "otp mail accepted"))
            .map_err(|e| {
                error!(
                    error = %e,
                    email = %mask_email(&key.email),
                    "otp mail dispatch failed"
                );
                DomainError::MailDispatch { message: e }
            })
    }

    /// Malformed input counts as a wrong guess but skips bcrypt
    async fn code_matches(&self, code: &str, token: &OtpToken) -> DomainResult<bool> {
        let well_formed =
            code.len() == self.config.code_length && code.chars().all(|c| c.is_ascii_digit());
        if !well_formed {
            return Ok(false);
        }
        self.passwords.verify(code, &token.code_hash).await
    }

    async fn destroy(&self, token: &OtpToken) -> DomainResult<()> {
        self.otps.delete(token.id).await?;
        if let Err(e) = self.cache.delete(&token.key().code_cache_key()).await {
            warn!(error = %e, "failed to drop cached otp code");
        }
        Ok(())
    }

    async fn release_cooldown(&self, key: &OtpKey) {
        if let Err(e) = self.cache.delete(&key.cooldown_cache_key()).await {
            warn!(error = %e, "failed to release otp cooldown");
        }
    }
}
