//! Token service module for JWT management
//!
//! - Stateless access tokens: mint and verify
//! - Stateful refresh tokens backed by refresh session rows
//! - Rotate-on-use refresh with a single winner under concurrency
//! - Session revocation (one, or all for a principal)

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
