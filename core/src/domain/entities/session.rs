//! Refresh session entity: the stateful half of a refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::principal::PrincipalType;

/// Longest user-agent string kept on a session row
pub const MAX_USER_AGENT_LENGTH: usize = 512;

/// Matches the `ip` column width
pub const MAX_IP_LENGTH: usize = 64;

/// Why a session stopped being active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationReason {
    /// Consumed by the refresh endpoint and replaced
    Rotated,
    /// Session-scoped logout
    Logout,
    /// "Log out of all devices"
    GlobalLogout,
    /// Password replaced through the reset flow
    PasswordReset,
}

impl RevocationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevocationReason::Rotated => "rotated",
            RevocationReason::Logout => "logout",
            RevocationReason::GlobalLogout => "global_logout",
            RevocationReason::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevocationReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rotated" => Ok(RevocationReason::Rotated),
            "logout" => Ok(RevocationReason::Logout),
            "global_logout" => Ok(RevocationReason::GlobalLogout),
            "password_reset" => Ok(RevocationReason::PasswordReset),
            other => Err(format!("unknown revocation reason: {}", other)),
        }
    }
}

/// Optional client details recorded on a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMetadata {
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            ip: ip.map(|ip| ip.chars().take(MAX_IP_LENGTH).collect()),
            user_agent: user_agent.map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect()),
        }
    }
}

/// Persisted record of an issued refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSession {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub principal_type: PrincipalType,

    /// Token identifier embedded in the refresh JWT; unique
    pub jti: String,

    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_reason: Option<RevocationReason>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RefreshSession {
    pub fn new(
        principal_id: Uuid,
        principal_type: PrincipalType,
        jti: String,
        expires_at: DateTime<Utc>,
        metadata: ClientMetadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal_id,
            principal_type,
            jti,
            expires_at,
            revoked: false,
            revoked_reason: None,
            revoked_at: None,
            ip: metadata.ip,
            user_agent: metadata.user_agent,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Not revoked and not expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    pub fn revoke(&mut self, reason: RevocationReason, now: DateTime<Utc>) {
        self.revoked = true;
        self.revoked_reason = Some(reason);
        self.revoked_at = Some(now);
    }
}
