use actix_web::{web, HttpResponse};

use crate::dto::{parse_user_id, required, PasswordResetRequest};
use crate::handlers::ApiError;
use crate::routes::AppState;

use gb_core::errors::OtpError;
use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

use super::cookie::removal_cookie;

/// Handler for POST /api/v1/auth/password/reset
///
/// A verified `password_reset` code authorizes the new password. Every
/// refresh session of the account is revoked afterwards.
///
/// # Request Body
///
/// ```json
/// { "userId": "uuid", "email": "jane@example.com", "code": "123456", "newPassword": "..." }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing field, malformed id, or invalid/expired code
/// - 422 Unprocessable Entity: New password too short or too long
/// - 429 Too Many Requests: Attempt cap reached, the code is destroyed
pub async fn reset_password<P, S, O, C, M>(
    state: web::Data<AppState<P, S, O, C, M>>,
    body: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let principal_id = parse_user_id(required(&body.user_id)?)?;
    let email = required(&body.email)?;
    let code = required(&body.code)?;
    let new_password = body
        .new_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(OtpError::MissingParameters)?;

    state
        .auth_service
        .reset_password(principal_id, email, code, new_password)
        .await?;

    Ok(HttpResponse::NoContent()
        .cookie(removal_cookie(&state.cookie))
        .finish())
}
