use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use crate::handlers::ApiError;
use crate::middleware::CurrentToken;
use crate::routes::AppState;

use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

use super::bearer_token;
use super::cookie::{read_refresh_token, removal_cookie};

/// Handler for POST /api/v1/auth/logout
///
/// Ends the session named by the refresh cookie and, when a bearer token is
/// sent, blacklists it until it expires. Idempotent and never fails: a
/// missing, unknown or already revoked token still yields 204 and the
/// cookie is always cleared.
pub async fn logout<P, S, O, C, M>(
    req: HttpRequest,
    state: web::Data<AppState<P, S, O, C, M>>,
) -> HttpResponse
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let refresh_token = read_refresh_token(&req, &state.cookie);
    state
        .auth_service
        .logout(refresh_token.as_deref(), bearer_token(&req))
        .await;

    HttpResponse::NoContent()
        .cookie(removal_cookie(&state.cookie))
        .finish()
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every refresh session of the caller. Requires a valid bearer
/// token for an active account; the token used is blacklisted as well.
pub async fn logout_all<P, S, O, C, M>(
    state: web::Data<AppState<P, S, O, C, M>>,
    current: CurrentToken,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let revoked = state.auth_service.logout_all(&current.0).await?;
    info!(
        principal_id = %current.0.principal_id,
        sessions_revoked = revoked,
        "global logout"
    );

    Ok(HttpResponse::NoContent()
        .cookie(removal_cookie(&state.cookie))
        .finish())
}
