//! Repository interfaces for the persisted stores.
//!
//! Each store exposes its mutations as single conditional updates so that
//! concurrent writers race inside the database, not in application code.

pub mod otp;
pub mod principal;
pub mod session;

pub use otp::OtpRepository;
pub use principal::PrincipalRepository;
pub use session::SessionRepository;

#[cfg(any(test, feature = "mock-services"))]
pub use otp::MockOtpRepository;
#[cfg(any(test, feature = "mock-services"))]
pub use principal::MockPrincipalRepository;
#[cfg(any(test, feature = "mock-services"))]
pub use session::MockSessionRepository;
