mod traits;

pub use traits::SessionRepository;

#[cfg(any(test, feature = "mock-services"))]
pub mod mock;
#[cfg(any(test, feature = "mock-services"))]
pub use mock::MockSessionRepository;
