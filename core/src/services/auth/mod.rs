//! Authentication service module
//!
//! Orchestrates the credential, token and OTP services into the account
//! flows: registration, login, refresh, logout (session-scoped and global)
//! and password reset.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::{AuthService, RegistrationRequest};
