use actix_web::{web, HttpResponse};

use crate::dto::{required, MessageResponse, OtpVerifyBody};
use crate::handlers::ApiError;
use crate::routes::AppState;

use gb_core::domain::value_objects::{OtpRejection, OtpVerification};
use gb_core::errors::OtpError;
use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

use super::OtpTarget;

/// Handler for POST /api/v1/otp/verify
///
/// Consumes the code. For `register` and `login` purposes this marks the
/// account email verified; other purposes only prove possession and are
/// spent by the flow that uses them.
///
/// ## Errors
/// - 400 Bad Request: Missing parameter, unknown purpose, or a code that is
///   wrong, expired or already used
/// - 429 Too Many Requests: Attempt cap reached, the code is destroyed
pub async fn verify_otp<P, S, O, C, M>(
    state: web::Data<AppState<P, S, O, C, M>>,
    body: web::Json<OtpVerifyBody>,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    let target = OtpTarget::parse(&body.user_id, &body.email, &body.purpose)?;
    let code = required(&body.code)?;

    let outcome = state
        .auth_service
        .otp_service()
        .verify_otp(target.principal_id, target.email, target.purpose, code)
        .await?;

    match outcome {
        OtpVerification::Verified => {
            Ok(HttpResponse::Ok().json(MessageResponse::new("Verification successful")))
        }
        OtpVerification::Rejected(OtpRejection::InvalidOrExpired) => {
            Err(OtpError::InvalidOrExpired.into())
        }
        OtpVerification::Rejected(OtpRejection::TooManyAttempts) => {
            Err(OtpError::TooManyAttempts.into())
        }
    }
}
