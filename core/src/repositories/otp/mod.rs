mod traits;

pub use traits::OtpRepository;

#[cfg(any(test, feature = "mock-services"))]
pub mod mock;
#[cfg(any(test, feature = "mock-services"))]
pub use mock::MockOtpRepository;
