use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::dto::{EmployerRegistrationRequest, RegisterResponse, WorkerRegistrationRequest};
use crate::handlers::ApiError;
use crate::routes::AppState;

use gb_core::domain::value_objects::RegistrationResult;
use gb_core::repositories::{OtpRepository, PrincipalRepository, SessionRepository};
use gb_core::services::{CacheServiceTrait, MailServiceTrait};

fn created(result: RegistrationResult) -> HttpResponse {
    HttpResponse::Created().json(RegisterResponse {
        user_id: result.principal_id,
        email: result.email,
        verification_required: true,
    })
}

/// Handler for POST /api/v1/auth/register/worker
///
/// Creates an unverified worker account and mails a `register` code. No
/// tokens are issued until the email is verified and the worker logs in.
///
/// # Request Body
///
/// ```json
/// {
///     "email": "jane@example.com",
///     "password": "at least 8 chars",
///     "fullName": "Jane Doe",
///     "skills": ["plumbing"]
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "userId": "uuid", "email": "jane@example.com", "verificationRequired": true }
/// ```
///
/// ## Errors
/// - 409 Conflict: Email already registered
/// - 422 Unprocessable Entity: Body fails validation
pub async fn register_worker<P, S, O, C, M>(
    state: web::Data<AppState<P, S, O, C, M>>,
    body: web::Json<WorkerRegistrationRequest>,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    body.validate()?;
    let result = state.auth_service.register(body.into_inner().into()).await?;
    Ok(created(result))
}

/// Handler for POST /api/v1/auth/register/employer
///
/// Same flow as worker registration with an employer profile; `companyName`
/// is optional.
pub async fn register_employer<P, S, O, C, M>(
    state: web::Data<AppState<P, S, O, C, M>>,
    body: web::Json<EmployerRegistrationRequest>,
) -> Result<HttpResponse, ApiError>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
    C: CacheServiceTrait + 'static,
    M: MailServiceTrait + 'static,
{
    body.validate()?;
    let result = state.auth_service.register(body.into_inner().into()).await?;
    Ok(created(result))
}
