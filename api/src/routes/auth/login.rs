use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::dto::{AccessTokenResponse, LoginRequest};
use crate::handlers::ApiError;
use crate::routes::{client_metadata, AppState};

use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

use super::cookie::refresh_cookie;

/// Handler for POST /api/v1/auth/login
///
/// Checks email and password and opens a refresh session. The access token
/// is returned in the body; the refresh token only in the cookie.
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "accessToken": "eyJ...", "expiresIn": 900, "tokenType": "Bearer" }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Unknown email or wrong password (same message)
/// - 403 Forbidden: Account blocked
/// - 409 Conflict: Email not verified yet
pub async fn login<P, S, O, C, M>(
    req: HttpRequest,
    state: web::Data<AppState<P, S, O, C, M>>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    body.validate()?;

    let result = state
        .auth_service
        .login(&body.email, &body.password, client_metadata(&req))
        .await?;
    let tokens = &result.tokens;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            &state.cookie,
            &tokens.refresh_token,
            tokens.refresh_expires_in,
        ))
        .json(AccessTokenResponse::from(tokens)))
}
