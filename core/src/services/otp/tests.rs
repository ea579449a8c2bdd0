use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{OtpKey, OtpPurpose, Principal, Role, RoleProfile, WorkerProfile};
use crate::domain::value_objects::{OtpRejection, OtpVerification};
use crate::errors::{DomainError, OtpError};
use crate::repositories::{
    MockOtpRepository, MockPrincipalRepository, OtpRepository, PrincipalRepository,
};
use crate::services::mock::{MockCacheService, MockMailService};
use crate::services::password::PasswordService;
use crate::services::traits::CacheServiceTrait;

use super::{OtpService, OtpServiceConfig};

type TestOtpService =
    OtpService<MockOtpRepository, MockPrincipalRepository, MockCacheService, MockMailService>;

struct Fixture {
    service: TestOtpService,
    otps: MockOtpRepository,
    principals: MockPrincipalRepository,
    cache: MockCacheService,
    mail: MockMailService,
    principal_id: Uuid,
}

const EMAIL: &str = "jane@example.com";

async fn fixture() -> Fixture {
    let otps = MockOtpRepository::new();
    let principals = MockPrincipalRepository::new();
    let cache = MockCacheService::new();
    let mail = MockMailService::new();

    let principal = Principal::new(EMAIL, "hash".into(), Role::Worker, Duration::hours(24));
    let principal_id = principal.id;
    principals
        .create_with_profile(
            principal,
            RoleProfile::Worker(WorkerProfile {
                full_name: "Jane Doe".into(),
                skills: vec!["plumbing".into()],
            }),
        )
        .await
        .unwrap();

    let service = OtpService::new(
        Arc::new(otps.clone()),
        Arc::new(principals.clone()),
        Arc::new(cache.clone()),
        Arc::new(mail.clone()),
        Arc::new(PasswordService::new(4)),
        OtpServiceConfig::default(),
    );

    Fixture {
        service,
        otps,
        principals,
        cache,
        mail,
        principal_id,
    }
}

impl Fixture {
    fn key(&self, purpose: OtpPurpose) -> OtpKey {
        OtpKey::new(self.principal_id, EMAIL, purpose)
    }

    async fn last_code(&self, purpose: OtpPurpose) -> String {
        self.mail.last_code(EMAIL, purpose).await.unwrap()
    }

    async fn cached_code(&self, key: &OtpKey) -> Option<String> {
        self.cache.get(&key.code_cache_key()).await.unwrap()
    }

    async fn verify(&self, purpose: OtpPurpose, code: &str) -> OtpVerification {
        self.service
            .verify_otp(self.principal_id, EMAIL, purpose, code)
            .await
            .unwrap()
    }
}

fn wrong_code(code: &str) -> String {
    if code == "000000" {
        "000001".to_string()
    } else {
        "000000".to_string()
    }
}

#[test]
fn test_generate_code_is_six_digits() {
    let service: TestOtpService = OtpService::new(
        Arc::new(MockOtpRepository::new()),
        Arc::new(MockPrincipalRepository::new()),
        Arc::new(MockCacheService::new()),
        Arc::new(MockMailService::new()),
        Arc::new(PasswordService::new(4)),
        OtpServiceConfig::default(),
    );
    for _ in 0..50 {
        let code = service.generate_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[tokio::test]
async fn test_request_issues_new_code() {
    let f = fixture().await;

    let result = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();

    assert!(!result.resent);
    assert_eq!(f.otps.write_count(), 1);
    assert_eq!(f.mail.sent_count(), 1);

    let key = f.key(OtpPurpose::Register);
    let code = f.last_code(OtpPurpose::Register).await;
    assert_eq!(
        f.cache.ttl(&key.code_cache_key()).await.map(|t| t.num_seconds() > 590),
        Some(true)
    );
    let row = f.otps.find_any(&key).await.unwrap();
    assert_ne!(row.code_hash, code);
    assert_eq!(row.attempts, 0);
}

#[tokio::test]
async fn test_request_inside_cooldown_has_no_side_effects() {
    let f = fixture().await;
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();

    let second = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();

    assert!(second.resent);
    assert_eq!(f.otps.write_count(), 1);
    assert_eq!(f.mail.sent_count(), 1);
}

#[tokio::test]
async fn test_request_after_cooldown_resends_cached_code() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Register);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    let first = f.last_code(OtpPurpose::Register).await;

    f.cache.expire(&key.cooldown_cache_key()).await;
    let result = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();

    assert!(result.resent);
    assert_eq!(f.otps.write_count(), 1);
    assert_eq!(f.mail.sent_count(), 2);
    assert_eq!(f.last_code(OtpPurpose::Register).await, first);
}

#[tokio::test]
async fn test_request_without_cached_code_overwrites_pending_row() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Login);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Login)
        .await
        .unwrap();
    let first_row = f.otps.find_any(&key).await.unwrap();

    f.cache.expire(&key.cooldown_cache_key()).await;
    f.cache.expire(&key.code_cache_key()).await;
    let result = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Login)
        .await
        .unwrap();

    assert!(!result.resent);
    assert_eq!(f.otps.write_count(), 2);
    assert_eq!(f.otps.count().await, 1);
    let second_row = f.otps.find_any(&key).await.unwrap();
    assert_eq!(second_row.id, first_row.id);
    assert_ne!(second_row.code_hash, first_row.code_hash);
}

#[tokio::test]
async fn test_request_scopes_by_purpose() {
    let f = fixture().await;
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    let other = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::PasswordReset)
        .await
        .unwrap();

    assert!(!other.resent);
    assert_eq!(f.otps.count().await, 2);
}

#[tokio::test]
async fn test_request_rejects_bad_input() {
    let f = fixture().await;

    let missing = f
        .service
        .request_otp(f.principal_id, "  ", OtpPurpose::Register)
        .await;
    assert!(matches!(
        missing,
        Err(DomainError::Otp(OtpError::MissingParameters))
    ));

    let unknown = f
        .service
        .request_otp(Uuid::new_v4(), EMAIL, OtpPurpose::Register)
        .await;
    assert!(matches!(unknown, Err(DomainError::NotFound { .. })));

    let mismatch = f
        .service
        .request_otp(f.principal_id, "someone@else.io", OtpPurpose::Login)
        .await;
    assert!(matches!(
        mismatch,
        Err(DomainError::Otp(OtpError::EmailMismatch))
    ));
    assert_eq!(f.mail.sent_count(), 0);
}

#[tokio::test]
async fn test_email_change_targets_new_address() {
    let f = fixture().await;
    let result = f
        .service
        .request_otp(f.principal_id, "Jane.New@Example.com", OtpPurpose::EmailChange)
        .await
        .unwrap();

    assert!(!result.resent);
    assert!(f
        .mail
        .last_code("jane.new@example.com", OtpPurpose::EmailChange)
        .await
        .is_some());
}

#[tokio::test]
async fn test_request_with_cache_down_is_distinct_error() {
    let f = fixture().await;
    f.cache.set_unavailable(true);

    let result = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await;

    assert!(matches!(result, Err(DomainError::CacheUnavailable { .. })));
    assert_eq!(f.otps.write_count(), 0);
}

#[tokio::test]
async fn test_mail_failure_leaves_code_for_resend() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Register);
    f.mail.set_failure(true);

    let result = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await;
    assert!(matches!(result, Err(DomainError::MailDispatch { .. })));
    assert!(f.otps.find_any(&key).await.is_some());

    f.mail.set_failure(false);
    f.cache.expire(&key.cooldown_cache_key()).await;
    let retry = f
        .service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    assert!(retry.resent);
    assert_eq!(f.otps.write_count(), 1);

    let code = f.last_code(OtpPurpose::Register).await;
    assert_eq!(f.verify(OtpPurpose::Register, &code).await, OtpVerification::Verified);
}

#[tokio::test]
async fn test_verify_register_marks_email_verified() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Register);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Register).await;

    assert_eq!(f.verify(OtpPurpose::Register, &code).await, OtpVerification::Verified);

    let principal = f.principals.find_by_id(f.principal_id).await.unwrap().unwrap();
    assert!(principal.email_verified);
    assert!(principal.verification_deadline.is_none());
    assert!(f.cached_code(&key).await.is_none());
}

#[tokio::test]
async fn test_verify_is_single_use() {
    let f = fixture().await;
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Login)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Login).await;

    assert!(f.verify(OtpPurpose::Login, &code).await.is_verified());
    assert_eq!(
        f.verify(OtpPurpose::Login, &code).await,
        OtpVerification::Rejected(OtpRejection::InvalidOrExpired)
    );
}

#[tokio::test]
async fn test_concurrent_verify_has_one_winner() {
    let f = fixture().await;
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Login)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Login).await;

    let (a, b) = tokio::join!(
        f.verify(OtpPurpose::Login, &code),
        f.verify(OtpPurpose::Login, &code)
    );
    assert_eq!(a.is_verified() as u8 + b.is_verified() as u8, 1);
}

#[tokio::test]
async fn test_password_reset_does_not_touch_principal() {
    let f = fixture().await;
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::PasswordReset)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::PasswordReset).await;

    assert!(f.verify(OtpPurpose::PasswordReset, &code).await.is_verified());
    let principal = f.principals.find_by_id(f.principal_id).await.unwrap().unwrap();
    assert!(!principal.email_verified);
}

#[tokio::test]
async fn test_wrong_code_counts_attempt() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Register);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Register).await;

    assert_eq!(
        f.verify(OtpPurpose::Register, &wrong_code(&code)).await,
        OtpVerification::Rejected(OtpRejection::InvalidOrExpired)
    );
    assert_eq!(
        f.verify(OtpPurpose::Register, "12ab").await,
        OtpVerification::Rejected(OtpRejection::InvalidOrExpired)
    );
    assert_eq!(f.otps.find_any(&key).await.unwrap().attempts, 2);
}

#[tokio::test]
async fn test_attempt_cap_destroys_code() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Register);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Register).await;
    let wrong = wrong_code(&code);

    for _ in 0..4 {
        assert_eq!(
            f.verify(OtpPurpose::Register, &wrong).await,
            OtpVerification::Rejected(OtpRejection::InvalidOrExpired)
        );
    }
    assert_eq!(
        f.verify(OtpPurpose::Register, &wrong).await,
        OtpVerification::Rejected(OtpRejection::TooManyAttempts)
    );
    assert!(f.otps.find_any(&key).await.is_none());
    assert!(f.cached_code(&key).await.is_none());

    // Even the right code is dead now
    assert_eq!(
        f.verify(OtpPurpose::Register, &code).await,
        OtpVerification::Rejected(OtpRejection::InvalidOrExpired)
    );
}

#[tokio::test]
async fn test_row_already_at_cap_is_deleted_on_lookup() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Login);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Login)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Login).await;
    let row = f.otps.find_any(&key).await.unwrap();
    for _ in 0..5 {
        f.otps.increment_attempts(row.id).await.unwrap();
    }

    assert_eq!(
        f.verify(OtpPurpose::Login, &code).await,
        OtpVerification::Rejected(OtpRejection::TooManyAttempts)
    );
    assert_eq!(f.otps.count().await, 0);
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let f = fixture().await;
    let key = f.key(OtpPurpose::Register);
    f.service
        .request_otp(f.principal_id, EMAIL, OtpPurpose::Register)
        .await
        .unwrap();
    let code = f.last_code(OtpPurpose::Register).await;
    let row = f.otps.find_any(&key).await.unwrap();
    f.otps.expire(row.id).await;

    assert_eq!(
        f.verify(OtpPurpose::Register, &code).await,
        OtpVerification::Rejected(OtpRejection::InvalidOrExpired)
    );
}

#[tokio::test]
async fn test_verify_requires_code() {
    let f = fixture().await;
    let result = f
        .service
        .verify_otp(f.principal_id, EMAIL, OtpPurpose::Register, "")
        .await;
    assert!(matches!(
        result,
        Err(DomainError::Otp(OtpError::MissingParameters))
    ));
}
