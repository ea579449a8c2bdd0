//! OTP service module
//!
//! Generates, delivers and verifies short numeric codes scoped to a
//! (principal, purpose, email) triple. Codes are stored hashed; the
//! plaintext lives only in the ephemeral cache so a resend can reuse it.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::OtpServiceConfig;
pub use service::OtpService;
