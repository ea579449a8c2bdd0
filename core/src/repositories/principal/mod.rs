mod traits;

pub use traits::PrincipalRepository;

#[cfg(any(test, feature = "mock-services"))]
pub mod mock;
#[cfg(any(test, feature = "mock-services"))]
pub use mock::MockPrincipalRepository;
