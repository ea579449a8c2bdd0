//! Principal entity: an authenticable account and its role-specific profile.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use gb_shared::utils::email::normalize_email;

/// Closed set of roles a principal registers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Posts jobs and hires workers
    Employer,
    /// Applies to jobs
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Worker => "worker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employer" => Ok(Role::Employer),
            "worker" => Ok(Role::Worker),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Which account table a session owner lives in. Both users and admins can
/// hold refresh sessions, so sessions carry the tag alongside the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrincipalType {
    User,
    Admin,
}

impl PrincipalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::User => "User",
            PrincipalType::Admin => "Admin",
        }
    }
}

impl fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrincipalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(PrincipalType::User),
            "Admin" => Ok(PrincipalType::Admin),
            other => Err(format!("unknown principal type: {}", other)),
        }
    }
}

/// Credential record
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,

    /// Lower-cased, trimmed email; unique across principals
    pub email: String,

    /// bcrypt hash, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,

    /// Set only by an administrative action
    pub is_blocked: bool,

    pub email_verified: bool,

    /// Unverified accounts are reaped after this instant
    pub verification_deadline: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Creates an unverified principal whose verification window closes
    /// after `grace`.
    pub fn new(email: &str, password_hash: String, role: Role, grace: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            password_hash,
            role,
            is_blocked: false,
            email_verified: false,
            verification_deadline: Some(now + grace),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mark_email_verified(&mut self) {
        self.email_verified = true;
        self.verification_deadline = None;
        self.updated_at = Utc::now();
    }

    /// Unverified and past its deadline
    pub fn is_verification_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.email_verified
            && self
                .verification_deadline
                .map(|deadline| deadline <= now)
                .unwrap_or(false)
    }

    pub fn owns_email(&self, email: &str) -> bool {
        self.email == normalize_email(email)
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("is_blocked", &self.is_blocked)
            .field("email_verified", &self.email_verified)
            .field("verification_deadline", &self.verification_deadline)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub full_name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub full_name: String,
    pub company_name: Option<String>,
}

/// Role-specific profile row created together with the principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleProfile {
    Worker(WorkerProfile),
    Employer(EmployerProfile),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Worker(_) => Role::Worker,
            RoleProfile::Employer(_) => Role::Employer,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            RoleProfile::Worker(p) => &p.full_name,
            RoleProfile::Employer(p) => &p.full_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_principal_is_unverified_with_deadline() {
        let principal = Principal::new(" Jane@Example.com ", "hash".into(), Role::Worker, Duration::hours(24));
        assert_eq!(principal.email, "jane@example.com");
        assert!(!principal.email_verified);
        assert!(!principal.is_blocked);
        assert!(principal.verification_deadline.is_some());
    }

    #[test]
    fn test_mark_email_verified_clears_deadline() {
        let mut principal = Principal::new("a@b.io", "hash".into(), Role::Employer, Duration::hours(24));
        principal.mark_email_verified();
        assert!(principal.email_verified);
        assert!(principal.verification_deadline.is_none());
        assert!(!principal.is_verification_expired_at(Utc::now() + Duration::days(30)));
    }

    #[test]
    fn test_verification_expiry() {
        let principal = Principal::new("a@b.io", "hash".into(), Role::Worker, Duration::hours(1));
        assert!(!principal.is_verification_expired_at(Utc::now()));
        assert!(principal.is_verification_expired_at(Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let principal = Principal::new("secret@b.io", "$2b$hash".into(), Role::Worker, Duration::hours(1));
        let rendered = format!("{:?}", principal);
        assert!(!rendered.contains("$2b$hash"));
        assert!(!rendered.contains("secret@b.io"));
    }

    #[test]
    fn test_role_and_type_parse() {
        assert_eq!("worker".parse::<Role>().unwrap(), Role::Worker);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!("Admin".parse::<PrincipalType>().unwrap(), PrincipalType::Admin);
        assert_eq!(PrincipalType::User.to_string(), "User");
    }

    #[test]
    fn test_profile_role() {
        let profile = RoleProfile::Employer(EmployerProfile {
            full_name: "Acme Owner".into(),
            company_name: Some("Acme".into()),
        });
        assert_eq!(profile.role(), Role::Employer);
        assert_eq!(profile.full_name(), "Acme Owner");
    }
}
