use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{AccessClaims, ClientMetadata, PrincipalType, RevocationReason};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{MockSessionRepository, SessionRepository};

use super::service::sign_for_test;
use super::{TokenService, TokenServiceConfig};

fn config() -> TokenServiceConfig {
    TokenServiceConfig {
        access_secret: "test-access-secret".to_string(),
        refresh_secret: "test-refresh-secret".to_string(),
        access_token_expiry_seconds: 900,
        refresh_token_expiry_seconds: 604_800,
        issuer: "gigboard".to_string(),
        audience: "gigboard-api".to_string(),
    }
}

fn service() -> (TokenService<MockSessionRepository>, MockSessionRepository) {
    let repo = MockSessionRepository::new();
    (TokenService::new(Arc::new(repo.clone()), config()), repo)
}

fn meta() -> ClientMetadata {
    ClientMetadata::new(Some("203.0.113.7".into()), Some("test-agent".into()))
}

#[test]
fn test_access_token_round_trip() {
    let (service, _) = service();
    let principal_id = Uuid::new_v4();

    let token = service.generate_access_token(principal_id).unwrap();
    let claims = service.verify_access_token(&token).unwrap();

    assert_eq!(claims.principal_id().unwrap(), principal_id);
    assert_eq!(claims.exp - claims.iat, 900);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_access_tokens_get_distinct_jtis() {
    let (service, _) = service();
    let id = Uuid::new_v4();
    let a = service.verify_access_token(&service.generate_access_token(id).unwrap()).unwrap();
    let b = service.verify_access_token(&service.generate_access_token(id).unwrap()).unwrap();
    assert_ne!(a.jti, b.jti);
}

#[test]
fn test_verify_access_token_returns_none_on_garbage() {
    let (service, _) = service();
    assert!(service.verify_access_token("").is_none());
    assert!(service.verify_access_token("not.a.jwt").is_none());
}

#[test]
fn test_verify_access_token_rejects_expired() {
    let (service, _) = service();
    let past = Utc::now() - Duration::hours(2);
    let claims = AccessClaims {
        sub: Uuid::new_v4().to_string(),
        iat: past.timestamp(),
        exp: (past + Duration::minutes(15)).timestamp(),
        nbf: past.timestamp(),
        iss: "gigboard".into(),
        aud: "gigboard-api".into(),
        jti: Uuid::new_v4().to_string(),
    };
    let token = sign_for_test(&claims, "test-access-secret");
    assert!(service.verify_access_token(&token).is_none());
}

#[test]
fn test_verify_access_token_has_no_expiry_grace() {
    let (service, _) = service();
    let now = Utc::now();
    let claims = AccessClaims {
        sub: Uuid::new_v4().to_string(),
        iat: (now - Duration::minutes(15)).timestamp(),
        exp: (now - Duration::seconds(30)).timestamp(),
        nbf: (now - Duration::minutes(15)).timestamp(),
        iss: "gigboard".into(),
        aud: "gigboard-api".into(),
        jti: Uuid::new_v4().to_string(),
    };
    // A blacklist marker for this jti would already be gone
    let token = sign_for_test(&claims, "test-access-secret");
    assert!(service.verify_access_token(&token).is_none());
}

#[test]
fn test_verify_access_token_rejects_wrong_secret_and_audience() {
    let (service, _) = service();
    let now = Utc::now();
    let mut claims = AccessClaims {
        sub: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(15)).timestamp(),
        nbf: now.timestamp(),
        iss: "gigboard".into(),
        aud: "gigboard-api".into(),
        jti: Uuid::new_v4().to_string(),
    };
    assert!(service
        .verify_access_token(&sign_for_test(&claims, "someone-elses-secret"))
        .is_none());

    claims.aud = "other-api".into();
    assert!(service
        .verify_access_token(&sign_for_test(&claims, "test-access-secret"))
        .is_none());
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let (service, _) = service();
    let refresh = service
        .generate_refresh_token(Uuid::new_v4(), PrincipalType::User, meta())
        .await
        .unwrap();
    assert!(service.verify_access_token(&refresh).is_none());

    let access = service.generate_access_token(Uuid::new_v4()).unwrap();
    assert!(service.verify_refresh_token(&access).await.unwrap().is_none());
}

#[tokio::test]
async fn test_generate_refresh_token_persists_session() {
    let (service, repo) = service();
    let principal_id = Uuid::new_v4();

    let token = service
        .generate_refresh_token(principal_id, PrincipalType::User, meta())
        .await
        .unwrap();
    let verified = service.verify_refresh_token(&token).await.unwrap().unwrap();

    assert_eq!(verified.session.principal_id, principal_id);
    assert_eq!(verified.session.jti, verified.claims.jti);
    assert_eq!(verified.session.expires_at.timestamp(), verified.claims.exp);
    assert_eq!(verified.session.ip.as_deref(), Some("203.0.113.7"));
    assert_eq!(repo.count().await, 1);
}

#[tokio::test]
async fn test_verify_refresh_token_none_when_session_revoked_or_expired() {
    let (service, repo) = service();
    let principal_id = Uuid::new_v4();
    let token = service
        .generate_refresh_token(principal_id, PrincipalType::User, meta())
        .await
        .unwrap();
    let jti = service.verify_refresh_token(&token).await.unwrap().unwrap().claims.jti;

    repo.expire(&jti).await;
    assert!(service.verify_refresh_token(&token).await.unwrap().is_none());

    let token = service
        .generate_refresh_token(principal_id, PrincipalType::User, meta())
        .await
        .unwrap();
    assert!(service.revoke_session(&token, RevocationReason::Logout).await.unwrap());
    assert!(service.verify_refresh_token(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rotation_is_single_use() {
    let (service, repo) = service();
    let principal_id = Uuid::new_v4();
    let pair = service
        .issue_pair(principal_id, PrincipalType::User, meta())
        .await
        .unwrap();

    let rotated = service.refresh(&pair.refresh_token, meta()).await.unwrap();
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert!(service.verify_refresh_token(&rotated.refresh_token).await.unwrap().is_some());

    let reused = service.refresh(&pair.refresh_token, meta()).await;
    assert!(matches!(
        reused,
        Err(DomainError::Token(TokenError::InvalidRefreshToken))
    ));
    assert_eq!(repo.count().await, 2);
}

#[tokio::test]
async fn test_rotation_records_reason() {
    let (service, repo) = service();
    let pair = service
        .issue_pair(Uuid::new_v4(), PrincipalType::User, meta())
        .await
        .unwrap();
    let verified = service.verify_refresh_token(&pair.refresh_token).await.unwrap().unwrap();

    service.rotate(&verified, meta()).await.unwrap();

    let old = repo.get(&verified.claims.jti).await.unwrap();
    assert!(old.revoked);
    assert_eq!(old.revoked_reason, Some(RevocationReason::Rotated));
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let (service, repo) = service();
    let service = Arc::new(service);
    let principal_id = Uuid::new_v4();
    let pair = service
        .issue_pair(principal_id, PrincipalType::User, meta())
        .await
        .unwrap();

    // Both callers pass verification before either revokes
    let first = service.verify_refresh_token(&pair.refresh_token).await.unwrap().unwrap();
    let second = service.verify_refresh_token(&pair.refresh_token).await.unwrap().unwrap();

    let (a, b) = tokio::join!(service.rotate(&first, meta()), service.rotate(&second, meta()));
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    let active = repo
        .find_active_by_principal(principal_id, PrincipalType::User)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_concurrent_refresh_calls_one_succeeds() {
    let (service, _) = service();
    let service = Arc::new(service);
    let pair = service
        .issue_pair(Uuid::new_v4(), PrincipalType::User, meta())
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let token = pair.refresh_token.clone();
            tokio::spawn(async move { service.refresh(&token, ClientMetadata::default()).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_revoke_session_tolerates_garbage() {
    let (service, _) = service();
    assert!(!service
        .revoke_session("garbage", RevocationReason::Logout)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revoke_all_only_touches_principal() {
    let (service, _) = service();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let a1 = service.issue_pair(alice, PrincipalType::User, meta()).await.unwrap();
    let a2 = service.issue_pair(alice, PrincipalType::User, meta()).await.unwrap();
    let b1 = service.issue_pair(bob, PrincipalType::User, meta()).await.unwrap();

    let count = service
        .revoke_all(alice, PrincipalType::User, RevocationReason::GlobalLogout)
        .await
        .unwrap();

    assert_eq!(count, 2);
    assert!(service.verify_refresh_token(&a1.refresh_token).await.unwrap().is_none());
    assert!(service.verify_refresh_token(&a2.refresh_token).await.unwrap().is_none());
    assert!(service.verify_refresh_token(&b1.refresh_token).await.unwrap().is_some());
}

#[tokio::test]
async fn test_purge_expired_sessions() {
    let (service, repo) = service();
    let token = service
        .generate_refresh_token(Uuid::new_v4(), PrincipalType::User, meta())
        .await
        .unwrap();
    let jti = service.verify_refresh_token(&token).await.unwrap().unwrap().claims.jti;
    repo.expire(&jti).await;

    assert_eq!(service.purge_expired_sessions().await.unwrap(), 1);
    assert_eq!(repo.count().await, 0);
}
