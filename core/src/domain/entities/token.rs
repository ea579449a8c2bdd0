//! JWT claims and token bundles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::PrincipalType;
use super::session::RefreshSession;

/// Claims carried by a short-lived access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (principal ID)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    pub iss: String,
    pub aud: String,

    /// JWT ID, the blacklist key
    pub jti: String,
}

impl AccessClaims {
    pub fn principal_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// Claims carried by a long-lived refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,

    /// Which account table the subject lives in
    pub ptype: PrincipalType,

    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,

    /// JWT ID, matches exactly one refresh session row
    pub jti: String,
}

impl RefreshClaims {
    pub fn principal_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }
}

/// A refresh token whose signature checked out and whose session is active
#[derive(Debug, Clone)]
pub struct VerifiedRefresh {
    pub claims: RefreshClaims,
    pub session: RefreshSession,
}

/// Access and refresh token issued together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds (cookie max-age)
    pub refresh_expires_in: i64,

    pub token_type: String,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
            token_type: String::from("Bearer"),
        }
    }
}
