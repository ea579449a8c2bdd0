//! Domain entities representing core business objects.

pub mod otp;
pub mod principal;
pub mod session;
pub mod token;

pub use otp::{OtpKey, OtpPurpose, OtpToken, CODE_LENGTH, MAX_ATTEMPTS};
pub use principal::{EmployerProfile, Principal, PrincipalType, Role, RoleProfile, WorkerProfile};
pub use session::{ClientMetadata, RefreshSession, RevocationReason, MAX_IP_LENGTH};
pub use token::{AccessClaims, RefreshClaims, TokenPair, VerifiedRefresh};
