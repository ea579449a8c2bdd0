use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use tracing::warn;

use crate::dto::AccessTokenResponse;
use crate::handlers::ApiError;
use crate::routes::{client_metadata, AppState};

use gb_core::errors::DomainError;
use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

use super::cookie::{read_refresh_token, refresh_cookie, removal_cookie};

/// Handler for POST /api/v1/auth/refresh
///
/// Rotates the refresh session named by the cookie. The request has no
/// body; a token supplied anywhere other than the cookie is ignored.
///
/// # Response
///
/// ## Success (200 OK)
/// Same body as login, with a new refresh cookie.
///
/// ## Errors
/// - 401 Unauthorized: Missing, invalid, expired, revoked or already rotated
///   token. The cookie is cleared.
/// - 403 Forbidden: Account blocked. Every session is revoked and the cookie
///   is cleared.
pub async fn refresh<P, S, O, C, M>(
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
    let presented = read_refresh_token(&req, &state.cookie);

    match state
        .auth_service
        .refresh(presented.as_deref(), client_metadata(&req))
        .await
    {
        Ok(tokens) => HttpResponse::Ok()
            .cookie(refresh_cookie(
                &state.cookie,
                &tokens.refresh_token,
                tokens.refresh_expires_in,
            ))
            .json(AccessTokenResponse::from(&tokens)),
        Err(error) => {
            // A dead token should not keep being replayed by the browser
            let clear = matches!(error, DomainError::Token(_) | DomainError::Auth(_));
            let mut response = ApiError(error).error_response();
            if clear {
                if let Err(e) = response.add_removal_cookie(&removal_cookie(&state.cookie)) {
                    warn!(error = %e, "failed to attach refresh cookie removal");
                }
            }
            response
        }
    }
}
