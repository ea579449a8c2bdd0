use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use gb_core::domain::entities::{EmployerProfile, Principal, Role, RoleProfile, TokenPair, WorkerProfile};
use gb_core::services::RegistrationRequest;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRegistrationRequest {
    #[validate(email)]
    pub email: String,

    /// bcrypt only looks at the first 72 bytes
    #[validate(length(min = 8, max = 72))]
    pub password: String,

    #[validate(length(min = 1, max = 120))]
    pub full_name: String,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub skills: Vec<String>,
}

impl From<WorkerRegistrationRequest> for RegistrationRequest {
    fn from(body: WorkerRegistrationRequest) -> Self {
        RegistrationRequest {
            email: body.email,
            password: body.password,
            profile: RoleProfile::Worker(WorkerProfile {
                full_name: body.full_name.trim().to_string(),
                skills: body
                    .skills
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmployerRegistrationRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 72))]
    pub password: String,

    #[validate(length(min = 1, max = 120))]
    pub full_name: String,

    #[validate(length(max = 200))]
    pub company_name: Option<String>,
}

impl From<EmployerRegistrationRequest> for RegistrationRequest {
    fn from(body: EmployerRegistrationRequest) -> Self {
        RegistrationRequest {
            email: body.email,
            password: body.password,
            profile: RoleProfile::Employer(EmployerProfile {
                full_name: body.full_name.trim().to_string(),
                company_name: body
                    .company_name
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    /// Always true: the account cannot log in until its email is verified
    pub verification_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Body of login and refresh responses. The refresh token travels only in
/// the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<&TokenPair> for AccessTokenResponse {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            expires_in: pair.access_expires_in,
            token_type: pair.token_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub code: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Principal> for MeResponse {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            email: principal.email.clone(),
            role: principal.role,
            email_verified: principal.email_verified,
            created_at: principal.created_at,
        }
    }
}
