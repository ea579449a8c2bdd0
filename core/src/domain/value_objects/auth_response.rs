//! Results returned by the authentication service.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{Principal, TokenPair};

/// Outcome of a committed registration
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResult {
    pub principal_id: Uuid,
    pub email: String,

    /// Whether the post-commit verification code reached the mail transport
    pub otp_dispatched: bool,
}

/// Successful login: the principal plus a fresh token pair
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub principal: Principal,
    pub tokens: TokenPair,
}

/// What a logout managed to do server-side. Logout never fails; this only
/// records which bookkeeping steps actually took effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogoutResult {
    pub session_revoked: bool,
    pub access_token_blacklisted: bool,
}
