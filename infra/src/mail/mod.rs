//! Outbound mail for one-time codes
//!
//! - `HttpMailService`: JSON mail API over HTTPS
//! - `LogMailService`: writes the message to the log, for local development
//!
//! `MailTransport` picks one from configuration so the rest of the
//! application sees a single concrete type.

pub mod http_mail;
pub mod log_mail;

pub use http_mail::HttpMailService;
pub use log_mail::LogMailService;

use async_trait::async_trait;
use tracing::{info, warn};

use gb_core::domain::entities::OtpPurpose;
use gb_core::services::MailServiceTrait;
use gb_shared::config::{MailConfig, MailProvider};

use crate::InfrastructureError;

/// Subject and body for an OTP message
pub fn compose_otp_message(code: &str, purpose: OtpPurpose, ttl_minutes: i64) -> (String, String) {
    let subject = match purpose {
        OtpPurpose::Register => "Confirm your Gigboard account",
        OtpPurpose::Login => "Your Gigboard sign-in code",
        OtpPurpose::EmailChange => "Confirm your new email address",
        OtpPurpose::PasswordReset => "Reset your Gigboard password",
    };
    let body = format!(
        "Your verification code is {}.\n\nIt expires in {} minutes. If you did not request it, you can ignore this email.",
        code, ttl_minutes
    );
    (subject.to_string(), body)
}

/// Configured mail transport
pub enum MailTransport {
    Http(HttpMailService),
    Log(LogMailService),
}

impl MailTransport {
    /// Build the transport named by `config.provider`.
    ///
    /// An HTTP provider without credentials falls back to the log transport
    /// with a warning rather than failing startup.
    pub fn from_config(config: &MailConfig, otp_ttl_seconds: i64) -> Result<Self, InfrastructureError> {
        match config.provider {
            MailProvider::Http if config.is_http_configured() => {
                info!("Using HTTP mail transport");
                Ok(MailTransport::Http(HttpMailService::new(config.clone(), otp_ttl_seconds)?))
            }
            MailProvider::Http => {
                warn!("MAIL_API_URL or MAIL_API_KEY missing, falling back to log mail transport");
                Ok(MailTransport::Log(LogMailService::new(otp_ttl_seconds)))
            }
            MailProvider::Log => {
                info!("Using log mail transport");
                Ok(MailTransport::Log(LogMailService::new(otp_ttl_seconds)))
            }
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            MailTransport::Http(_) => "http",
            MailTransport::Log(_) => "log",
        }
    }
}

#[async_trait]
impl MailServiceTrait for MailTransport {
    async fn send_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<String, String> {
        match self {
            MailTransport::Http(service) => service.send_otp(email, code, purpose).await,
            MailTransport::Log(service) => service.send_otp(email, code, purpose).await,
        }
    }
}
