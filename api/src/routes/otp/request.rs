use actix_web::{web, HttpResponse};

use crate::dto::{OtpRequestBody, OtpRequestResponse};
use crate::handlers::ApiError;
use crate::routes::AppState;

use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

use super::OtpTarget;

/// Handler for POST /api/v1/otp/request
///
/// Issues a code for the triple, or silently re-sends the pending one.
/// Requests inside the resend cooldown do nothing and still answer 200.
///
/// # Request Body
///
/// ```json
/// { "userId": "uuid", "email": "jane@example.com", "purpose": "register" }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "message": "Verification code sent", "resent": false }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Missing parameter, unknown purpose, or email mismatch
/// - 404 Not Found: Unknown user
/// - 502 Bad Gateway: Mail provider failure
/// - 503 Service Unavailable: Cache unavailable
pub async fn request_otp<P, S, O, C, M>(
    state: web::Data<AppState<P, S, O, C, M>>,
    body: web::Json<OtpRequestBody>,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let target = OtpTarget::parse(&body.user_id, &body.email, &body.purpose)?;

    let result = state
        .auth_service
        .otp_service()
        .request_otp(target.principal_id, target.email, target.purpose)
        .await?;

    Ok(HttpResponse::Ok().json(OtpRequestResponse {
        message: "Verification code sent".to_string(),
        resent: result.resent,
    }))
}
