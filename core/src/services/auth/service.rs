//! Main authentication service implementation

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use gb_shared::utils::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::{
    ClientMetadata, OtpPurpose, Principal, PrincipalType, RevocationReason, RoleProfile, TokenPair,
};
use crate::domain::value_objects::{
    LoginResult, LogoutResult, OtpRejection, OtpVerification, RegistrationResult,
};
use crate::errors::{
    AuthError, DomainError, DomainResult, OtpError, TokenError, ValidationError,
};
use crate::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use crate::services::otp::OtpService;
use crate::services::password::PasswordService;
use crate::services::revocation::RevocationService;
use crate::services::session_guard::AuthenticatedToken;
use crate::services::token::TokenService;
use crate::services::traits::{CacheServiceTrait, MailServiceTrait};

use super::config::AuthServiceConfig;

/// Input for a new account
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub profile: RoleProfile,
}

/// Account flows built on the token, OTP and revocation services
pub struct AuthService<P, S, O, C, M>
where
    P: PrincipalRepository,
    S: SessionRepository,
    O: OtpRepository,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    principals: Arc<P>,
    tokens: Arc<TokenService<S>>,
    otp: Arc<OtpService<O, P, C, M>>,
    revocation: Arc<RevocationService<C>>,
    passwords: Arc<PasswordService>,
    config: AuthServiceConfig,
}

impl<P, S, O, C, M> AuthService<P, S, O, C, M>
where
    P: PrincipalRepository,
    S: SessionRepository,
    O: OtpRepository,
    C: CacheServiceTrait,
    M: MailServiceTrait,
{
    pub fn new(
        principals: Arc<P>,
        tokens: Arc<TokenService<S>>,
        otp: Arc<OtpService<O, P, C, M>>,
        revocation: Arc<RevocationService<C>>,
        passwords: Arc<PasswordService>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            principals,
            tokens,
            otp,
            revocation,
            passwords,
            config,
        }
    }

    pub fn token_service(&self) -> &Arc<TokenService<S>> {
        &self.tokens
    }

    pub fn otp_service(&self) -> &Arc<OtpService<O, P, C, M>> {
        &self.otp
    }

    /// Create an unverified account and its profile, then send the
    /// registration code.
    ///
    /// No tokens are issued here; the account must verify its email before
    /// the first login. The code is sent only after the principal and
    /// profile are committed, and a failed send does not undo the
    /// registration (the client can ask for a resend).
    ///
    /// # Returns
    /// * `Ok(RegistrationResult)` - Account committed
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Email taken
    /// * `Err(DomainError::ValidationErr(_))` - Bad email, password or profile
    pub async fn register(&self, request: RegistrationRequest) -> DomainResult<RegistrationResult> {
        let email = normalize_email(&request.email);
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }
        self.check_password(&request.password)?;
        if request.profile.full_name().trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "fullName".to_string(),
            }
            .into());
        }

        let password_hash = self.passwords.hash(&request.password).await?;
        let principal = Principal::new(
            &email,
            password_hash,
            request.profile.role(),
            self.config.verification_grace,
        );
        let principal = self
            .principals
            .create_with_profile(principal, request.profile)
            .await?;

        info!(
            principal_id = %principal.id,
            role = %principal.role,
            email = %mask_email(&principal.email),
            "principal registered"
        );

        let otp_dispatched = match self
            .otp
            .request_otp(principal.id, &principal.email, OtpPurpose::Register)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(principal_id = %principal.id, error = %e, "registration code not sent");
                false
            }
        };

        Ok(RegistrationResult {
            principal_id: principal.id,
            email: principal.email,
            otp_dispatched,
        })
    }

    /// Check credentials and open a session.
    ///
    /// Unknown email and wrong password give the same error and take the
    /// same time. Account state is only revealed after the password checks
    /// out.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        metadata: ClientMetadata,
    ) -> DomainResult<LoginResult> {
        let email = normalize_email(email);
        let principal = match self.principals.find_by_email(&email).await? {
            Some(principal) => principal,
            None => {
                self.passwords.verify_dummy(password).await;
                info!(email = %mask_email(&email), "login for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self.passwords.verify(password, &principal.password_hash).await? {
            info!(principal_id = %principal.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }
        if principal.is_blocked {
            warn!(principal_id = %principal.id, "login attempt on blocked account");
            return Err(AuthError::UserBlocked.into());
        }
        if !principal.email_verified {
            return Err(AuthError::EmailNotVerified.into());
        }

        let tokens = self
            .tokens
            .issue_pair(principal.id, PrincipalType::User, metadata)
            .await?;
        info!(principal_id = %principal.id, "login succeeded");

        Ok(LoginResult { principal, tokens })
    }

    /// Exchange a refresh token for a new pair; the presented token is
    /// spent whether or not the caller keeps the result.
    pub async fn refresh(
        &self,
        refresh_token: Option<&str>,
        metadata: ClientMetadata,
    ) -> DomainResult<TokenPair> {
        let token = refresh_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(TokenError::MissingRefreshToken)?;

        let verified = self
            .tokens
            .verify_refresh_token(token)
            .await?
            .ok_or(TokenError::InvalidRefreshToken)?;

        if verified.session.principal_type == PrincipalType::User {
            let principal_id = verified.session.principal_id;
            match self.principals.find_by_id(principal_id).await? {
                Some(principal) if principal.is_blocked => {
                    self.tokens
                        .revoke_all(principal_id, PrincipalType::User, RevocationReason::GlobalLogout)
                        .await?;
                    return Err(AuthError::UserBlocked.into());
                }
                Some(_) => {}
                None => {
                    self.tokens
                        .revoke_session(token, RevocationReason::Logout)
                        .await?;
                    return Err(TokenError::InvalidRefreshToken.into());
                }
            }
        }

        self.tokens.rotate(&verified, metadata).await
    }

    /// End the current session. Never fails: every step is best-effort and
    /// the result reports which ones took effect.
    ///
    /// * `refresh_token` - Cookie value; its session is revoked
    /// * `access_token` - Bearer token (without the scheme); its jti is
    ///   blacklisted for the rest of its lifetime
    pub async fn logout(&self, refresh_token: Option<&str>, access_token: Option<&str>) -> LogoutResult {
        let mut result = LogoutResult::default();

        if let Some(token) = refresh_token.filter(|t| !t.is_empty()) {
            match self.tokens.revoke_session(token, RevocationReason::Logout).await {
                Ok(revoked) => result.session_revoked = revoked,
                Err(e) => warn!(error = %e, "logout could not revoke refresh session"),
            }
        }

        if let Some(claims) = access_token.and_then(|t| self.tokens.verify_access_token(t)) {
            match self.revocation.blacklist_access_jti(&claims.jti, claims.exp).await {
                Ok(blacklisted) => result.access_token_blacklisted = blacklisted,
                Err(e) => warn!(error = %e, "logout could not blacklist access token"),
            }
        }

        info!(
            session_revoked = result.session_revoked,
            access_token_blacklisted = result.access_token_blacklisted,
            "logout"
        );
        result
    }

    /// Revoke every session of the caller and blacklist the access token
    /// that made the request. Returns the number of sessions revoked.
    pub async fn logout_all(&self, current: &AuthenticatedToken) -> DomainResult<usize> {
        let count = self
            .tokens
            .revoke_all(current.principal_id, PrincipalType::User, RevocationReason::GlobalLogout)
            .await?;

        if let Err(e) = self
            .revocation
            .blacklist_access_jti(&current.jti, current.exp)
            .await
        {
            warn!(principal_id = %current.principal_id, error = %e, "global logout could not blacklist access token");
        }
        Ok(count)
    }

    /// Replace the password using a `password_reset` code as authorization,
    /// then revoke every session. Returns the number of sessions revoked.
    pub async fn reset_password(
        &self,
        principal_id: Uuid,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> DomainResult<usize> {
        // Validate first so a bad password does not burn the code
        self.check_password(new_password)?;

        match self
            .otp
            .verify_otp(principal_id, email, OtpPurpose::PasswordReset, code)
            .await?
        {
            OtpVerification::Verified => {}
            OtpVerification::Rejected(OtpRejection::InvalidOrExpired) => {
                return Err(OtpError::InvalidOrExpired.into())
            }
            OtpVerification::Rejected(OtpRejection::TooManyAttempts) => {
                return Err(OtpError::TooManyAttempts.into())
            }
        }

        let password_hash = self.passwords.hash(new_password).await?;
        if !self
            .principals
            .update_password_hash(principal_id, &password_hash)
            .await?
        {
            return Err(DomainError::NotFound {
                resource: "principal".to_string(),
            });
        }

        let count = self
            .tokens
            .revoke_all(principal_id, PrincipalType::User, RevocationReason::PasswordReset)
            .await?;
        info!(principal_id = %principal_id, sessions_revoked = count, "password reset");
        Ok(count)
    }

    /// Administrative block or unblock. Blocking also ends every session.
    pub async fn set_blocked(&self, principal_id: Uuid, blocked: bool) -> DomainResult<()> {
        if !self.principals.set_blocked(principal_id, blocked).await? {
            return Err(AuthError::UserNotFound.into());
        }
        if blocked {
            self.tokens
                .revoke_all(principal_id, PrincipalType::User, RevocationReason::GlobalLogout)
                .await?;
        }
        info!(principal_id = %principal_id, blocked, "principal block state changed");
        Ok(())
    }

    fn check_password(&self, password: &str) -> DomainResult<()> {
        let len = password.len();
        if len < self.config.min_password_length || len > self.config.max_password_length {
            return Err(ValidationError::InvalidLength {
                field: "password".to_string(),
                min: self.config.min_password_length,
                max: self.config.max_password_length,
            }
            .into());
        }
        Ok(())
    }
}
