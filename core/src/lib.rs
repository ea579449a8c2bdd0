//! # Gigboard Core
//!
//! Domain layer of the Gigboard auth core: principals, refresh sessions and
//! one-time codes, the repository and collaborator traits they are stored
//! and delivered through, and the services that run the session lifecycle.
//! Nothing in this crate performs I/O directly.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    AccessClaims, ClientMetadata, EmployerProfile, OtpKey, OtpPurpose, OtpToken, Principal,
    PrincipalType, RefreshClaims, RefreshSession, RevocationReason, Role, RoleProfile, TokenPair,
    VerifiedRefresh, WorkerProfile,
};
pub use domain::value_objects::{
    LoginResult, LogoutResult, OtpRejection, OtpRequestResult, OtpVerification,
    RegistrationResult,
};
pub use errors::{
    AuthError, DomainError, DomainResult, OtpError, TokenError, ValidationError,
};
pub use repositories::{OtpRepository, PrincipalRepository, SessionRepository};
pub use services::{
    AuthService, AuthServiceConfig, AuthenticatedToken, CacheServiceTrait, CleanupResult,
    CleanupService, CleanupServiceConfig, MailServiceTrait, OtpService, OtpServiceConfig,
    PasswordService, RegistrationRequest, RevocationService, SessionGuard, TokenService,
    TokenServiceConfig,
};
