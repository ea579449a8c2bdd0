//! One-time code route handlers
//!
//! Codes are scoped to a (user, purpose, email) triple. Every body field is
//! read as optional so that an absent one maps to `missing_parameters`.

pub mod request;
pub mod verify;

pub use request::request_otp;
pub use verify::verify_otp;

use uuid::Uuid;

use gb_core::domain::entities::OtpPurpose;

use crate::dto::{parse_user_id, required};
use crate::handlers::ApiError;

/// The triple both endpoints start from
pub(crate) struct OtpTarget<'a> {
    pub principal_id: Uuid,
    pub email: &'a str,
    pub purpose: OtpPurpose,
}

impl<'a> OtpTarget<'a> {
    pub(crate) fn parse(
        user_id: &'a Option<String>,
        email: &'a Option<String>,
        purpose: &'a Option<String>,
    ) -> Result<Self, ApiError> {
        let user_id = required(user_id)?;
        let email = required(email)?;
        let purpose = required(purpose)?;
        Ok(Self {
            principal_id: parse_user_id(user_id)?,
            email,
            purpose: purpose.parse()?,
        })
    }
}
