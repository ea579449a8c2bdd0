use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{
    ClientMetadata, EmployerProfile, OtpPurpose, RevocationReason, Role, RoleProfile,
    WorkerProfile,
};
use crate::errors::{AuthError, DomainError, OtpError, TokenError, ValidationError};
use crate::repositories::{
    MockOtpRepository, MockPrincipalRepository, MockSessionRepository, PrincipalRepository,
};
use crate::services::mock::{MockCacheService, MockMailService};
use crate::services::otp::{OtpService, OtpServiceConfig};
use crate::services::password::PasswordService;
use crate::services::revocation::RevocationService;
use crate::services::session_guard::SessionGuard;
use crate::services::token::{TokenService, TokenServiceConfig};

use super::{AuthService, AuthServiceConfig, RegistrationRequest};

type TestAuthService = AuthService<
    MockPrincipalRepository,
    MockSessionRepository,
    MockOtpRepository,
    MockCacheService,
    MockMailService,
>;

struct Fixture {
    auth: TestAuthService,
    guard: SessionGuard<MockSessionRepository, MockPrincipalRepository, MockCacheService>,
    principals: MockPrincipalRepository,
    sessions: MockSessionRepository,
    mail: MockMailService,
}

const PASSWORD: &str = "correct horse battery";

fn fixture() -> Fixture {
    let principals = MockPrincipalRepository::new();
    let sessions = MockSessionRepository::new();
    let otps = MockOtpRepository::new();
    let cache = MockCacheService::new();
    let mail = MockMailService::new();

    let passwords = Arc::new(PasswordService::new(4));
    let tokens = Arc::new(TokenService::new(
        Arc::new(sessions.clone()),
        TokenServiceConfig::default(),
    ));
    let revocation = Arc::new(RevocationService::new(Arc::new(cache.clone())));
    let otp = Arc::new(OtpService::new(
        Arc::new(otps),
        Arc::new(principals.clone()),
        Arc::new(cache),
        Arc::new(mail.clone()),
        passwords.clone(),
        OtpServiceConfig::default(),
    ));
    let auth = AuthService::new(
        Arc::new(principals.clone()),
        tokens.clone(),
        otp,
        revocation.clone(),
        passwords,
        AuthServiceConfig::default(),
    );
    let guard = SessionGuard::new(tokens, revocation, Arc::new(principals.clone()));

    Fixture {
        auth,
        guard,
        principals,
        sessions,
        mail,
    }
}

fn worker(email: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        profile: RoleProfile::Worker(WorkerProfile {
            full_name: "Sam Worker".into(),
            skills: vec!["carpentry".into(), "painting".into()],
        }),
    }
}

fn meta() -> ClientMetadata {
    ClientMetadata::new(Some("198.51.100.4".into()), Some("integration".into()))
}

impl Fixture {
    /// Register and complete email verification
    async fn verified_worker(&self, email: &str) -> Uuid {
        let registered = self.auth.register(worker(email)).await.unwrap();
        let code = self
            .mail
            .last_code(&registered.email, OtpPurpose::Register)
            .await
            .unwrap();
        let outcome = self
            .auth
            .otp_service()
            .verify_otp(registered.principal_id, &registered.email, OtpPurpose::Register, &code)
            .await
            .unwrap();
        assert!(outcome.is_verified());
        registered.principal_id
    }
}

#[tokio::test]
async fn test_register_creates_unverified_principal_and_sends_code() {
    let f = fixture();

    let result = f.auth.register(worker(" Sam@Example.com ")).await.unwrap();

    assert_eq!(result.email, "sam@example.com");
    assert!(result.otp_dispatched);
    let principal = f.principals.find_by_id(result.principal_id).await.unwrap().unwrap();
    assert!(!principal.email_verified);
    assert!(principal.verification_deadline.is_some());
    assert_eq!(principal.role, Role::Worker);
    assert!(f.mail.last_code("sam@example.com", OtpPurpose::Register).await.is_some());
    assert_eq!(f.sessions.count().await, 0);
}

#[tokio::test]
async fn test_register_employer_profile() {
    let f = fixture();
    let result = f
        .auth
        .register(RegistrationRequest {
            email: "hr@acme.io".into(),
            password: PASSWORD.into(),
            profile: RoleProfile::Employer(EmployerProfile {
                full_name: "Ann Boss".into(),
                company_name: Some("Acme".into()),
            }),
        })
        .await
        .unwrap();

    let profile = f.principals.profile_of(result.principal_id).await.unwrap();
    assert_eq!(profile.role(), Role::Employer);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let f = fixture();
    f.auth.register(worker("sam@example.com")).await.unwrap();

    let again = f.auth.register(worker("SAM@example.com")).await;
    assert!(matches!(
        again,
        Err(DomainError::Auth(AuthError::UserAlreadyExists))
    ));
    assert_eq!(f.principals.count().await, 1);
}

#[tokio::test]
async fn test_register_validates_input() {
    let f = fixture();

    let mut short = worker("sam@example.com");
    short.password = "short".into();
    assert!(matches!(
        f.auth.register(short).await,
        Err(DomainError::ValidationErr(ValidationError::InvalidLength { .. }))
    ));

    assert!(matches!(
        f.auth.register(worker("not-an-email")).await,
        Err(DomainError::ValidationErr(ValidationError::InvalidEmail))
    ));
    assert_eq!(f.principals.count().await, 0);
}

#[tokio::test]
async fn test_register_survives_mail_outage() {
    let f = fixture();
    f.mail.set_failure(true);

    let result = f.auth.register(worker("sam@example.com")).await.unwrap();

    assert!(!result.otp_dispatched);
    assert_eq!(f.principals.count().await, 1);
}

#[tokio::test]
async fn test_login_requires_verified_email() {
    let f = fixture();
    f.auth.register(worker("sam@example.com")).await.unwrap();

    let result = f.auth.login("sam@example.com", PASSWORD, meta()).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::EmailNotVerified))
    ));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let f = fixture();
    f.verified_worker("sam@example.com").await;

    let unknown = f.auth.login("nobody@example.com", PASSWORD, meta()).await.unwrap_err();
    let wrong = f.auth.login("sam@example.com", "wrong password!", meta()).await.unwrap_err();

    assert_eq!(unknown.to_string(), wrong.to_string());
    assert!(matches!(wrong, DomainError::Auth(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_blocked_account() {
    let f = fixture();
    let id = f.verified_worker("sam@example.com").await;
    f.auth.set_blocked(id, true).await.unwrap();

    let result = f.auth.login("sam@example.com", PASSWORD, meta()).await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::UserBlocked))));

    // Wrong password on a blocked account still reads as bad credentials
    let result = f.auth.login("sam@example.com", "nope nope nope", meta()).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::InvalidCredentials))
    ));
}

#[tokio::test]
async fn test_refresh_requires_token() {
    let f = fixture();
    assert!(matches!(
        f.auth.refresh(None, meta()).await,
        Err(DomainError::Token(TokenError::MissingRefreshToken))
    ));
    assert!(matches!(
        f.auth.refresh(Some("garbage"), meta()).await,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}

#[tokio::test]
async fn test_refresh_rejected_once_blocked() {
    let f = fixture();
    let id = f.verified_worker("sam@example.com").await;
    let login = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();
    f.principals.set_blocked(id, true).await.unwrap();

    let result = f.auth.refresh(Some(&login.tokens.refresh_token), meta()).await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::UserBlocked))));
}

#[tokio::test]
async fn test_logout_is_best_effort_and_idempotent() {
    let f = fixture();
    f.verified_worker("sam@example.com").await;
    let login = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();
    let tokens = login.tokens;

    let first = f
        .auth
        .logout(Some(&tokens.refresh_token), Some(&tokens.access_token))
        .await;
    assert!(first.session_revoked);
    assert!(first.access_token_blacklisted);

    let second = f
        .auth
        .logout(Some(&tokens.refresh_token), Some(&tokens.access_token))
        .await;
    assert!(!second.session_revoked);

    let nothing = f.auth.logout(None, Some("junk")).await;
    assert_eq!(nothing, Default::default());

    let header = format!("Bearer {}", tokens.access_token);
    assert!(matches!(
        f.guard.authenticate(Some(&header)).await,
        Err(DomainError::Token(TokenError::TokenRevoked))
    ));
}

#[tokio::test]
async fn test_logout_leaves_other_access_tokens_alone() {
    let f = fixture();
    f.verified_worker("sam@example.com").await;
    let laptop = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();
    let phone = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();

    f.auth
        .logout(Some(&laptop.tokens.refresh_token), Some(&laptop.tokens.access_token))
        .await;

    let phone_header = format!("Bearer {}", phone.tokens.access_token);
    assert!(f.guard.authenticate(Some(&phone_header)).await.is_ok());
    assert!(f
        .auth
        .refresh(Some(&phone.tokens.refresh_token), meta())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let f = fixture();
    f.verified_worker("sam@example.com").await;
    let laptop = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();
    let phone = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();

    let header = format!("Bearer {}", laptop.tokens.access_token);
    let (current, _) = f.guard.authenticate(Some(&header)).await.unwrap();
    let phone_jti = f
        .auth
        .token_service()
        .verify_refresh_token(&phone.tokens.refresh_token)
        .await
        .unwrap()
        .unwrap()
        .claims
        .jti;

    assert_eq!(f.auth.logout_all(&current).await.unwrap(), 2);
    for pair in [&laptop.tokens, &phone.tokens] {
        assert!(matches!(
            f.auth.refresh(Some(&pair.refresh_token), meta()).await,
            Err(DomainError::Token(TokenError::InvalidRefreshToken))
        ));
    }
    assert!(f.guard.authenticate(Some(&header)).await.is_err());

    // Only the calling access token is blacklisted; the other one runs out naturally
    let phone_header = format!("Bearer {}", phone.tokens.access_token);
    assert!(f.guard.authenticate(Some(&phone_header)).await.is_ok());

    let session = f.sessions.get(&phone_jti).await.unwrap();
    assert_eq!(session.revoked_reason, Some(RevocationReason::GlobalLogout));
}

#[tokio::test]
async fn test_password_reset_replaces_hash_and_revokes_sessions() {
    let f = fixture();
    let id = f.verified_worker("sam@example.com").await;
    let login = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();

    f.auth
        .otp_service()
        .request_otp(id, "sam@example.com", OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let code = f
        .mail
        .last_code("sam@example.com", OtpPurpose::PasswordReset)
        .await
        .unwrap();

    let revoked = f
        .auth
        .reset_password(id, "sam@example.com", &code, "a brand new secret")
        .await
        .unwrap();
    assert_eq!(revoked, 1);

    assert!(f
        .auth
        .refresh(Some(&login.tokens.refresh_token), meta())
        .await
        .is_err());
    assert!(f.auth.login("sam@example.com", PASSWORD, meta()).await.is_err());
    assert!(f
        .auth
        .login("sam@example.com", "a brand new secret", meta())
        .await
        .is_ok());

    // The code is spent
    let reuse = f
        .auth
        .reset_password(id, "sam@example.com", &code, "yet another secret")
        .await;
    assert!(matches!(
        reuse,
        Err(DomainError::Otp(OtpError::InvalidOrExpired))
    ));
}

#[tokio::test]
async fn test_password_reset_weak_password_keeps_code() {
    let f = fixture();
    let id = f.verified_worker("sam@example.com").await;
    f.auth
        .otp_service()
        .request_otp(id, "sam@example.com", OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let code = f
        .mail
        .last_code("sam@example.com", OtpPurpose::PasswordReset)
        .await
        .unwrap();

    assert!(matches!(
        f.auth.reset_password(id, "sam@example.com", &code, "short").await,
        Err(DomainError::ValidationErr(_))
    ));
    assert!(f
        .auth
        .reset_password(id, "sam@example.com", &code, "long enough now")
        .await
        .is_ok());
}

/// register → request OTP → verify → login → refresh → logout → stale refresh fails
#[tokio::test]
async fn test_end_to_end_session_lifecycle() {
    let f = fixture();

    let registered = f.auth.register(worker("sam@example.com")).await.unwrap();
    let id = registered.principal_id;

    // Explicit request inside the cooldown reuses the registration code
    let again = f
        .auth
        .otp_service()
        .request_otp(id, "sam@example.com", OtpPurpose::Register)
        .await
        .unwrap();
    assert!(again.resent);
    assert_eq!(f.mail.sent_count(), 1);

    let code = f.mail.last_code("sam@example.com", OtpPurpose::Register).await.unwrap();
    assert!(f
        .auth
        .otp_service()
        .verify_otp(id, "sam@example.com", OtpPurpose::Register, &code)
        .await
        .unwrap()
        .is_verified());
    assert!(f.principals.find_by_id(id).await.unwrap().unwrap().email_verified);

    let login = f.auth.login("sam@example.com", PASSWORD, meta()).await.unwrap();
    let header = format!("Bearer {}", login.tokens.access_token);
    let (token, principal) = f.guard.authenticate(Some(&header)).await.unwrap();
    assert_eq!(token.principal_id, id);
    assert_eq!(principal.email, "sam@example.com");

    let rotated = f
        .auth
        .refresh(Some(&login.tokens.refresh_token), meta())
        .await
        .unwrap();
    assert!(matches!(
        f.auth.refresh(Some(&login.tokens.refresh_token), meta()).await,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));

    let logout = f
        .auth
        .logout(Some(&rotated.refresh_token), Some(&rotated.access_token))
        .await;
    assert!(logout.session_revoked);

    assert!(matches!(
        f.auth.refresh(Some(&rotated.refresh_token), meta()).await,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
}
