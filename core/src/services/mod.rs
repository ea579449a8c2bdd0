//! Business services containing domain logic and use cases.

pub mod auth;
pub mod cleanup;
pub mod otp;
pub mod password;
pub mod revocation;
pub mod session_guard;
pub mod token;
pub mod traits;

#[cfg(any(test, feature = "mock-services"))]
pub mod mock;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, RegistrationRequest};
pub use cleanup::{CleanupResult, CleanupService, CleanupServiceConfig};
pub use otp::{OtpService, OtpServiceConfig};
pub use password::PasswordService;
pub use revocation::RevocationService;
pub use session_guard::{bearer_credentials, AuthenticatedToken, SessionGuard};
pub use token::{TokenService, TokenServiceConfig};
pub use traits::{CacheServiceTrait, MailServiceTrait};
