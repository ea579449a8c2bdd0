//! Mail transport that only logs. Never use in production: the code is
//! written to the log in clear.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use gb_core::domain::entities::OtpPurpose;
use gb_core::services::MailServiceTrait;
use gb_shared::utils::email::mask_email;

use super::compose_otp_message;

pub struct LogMailService {
    otp_ttl_minutes: i64,
}

impl LogMailService {
    pub fn new(otp_ttl_seconds: i64) -> Self {
        Self {
            otp_ttl_minutes: (otp_ttl_seconds / 60).max(1),
        }
    }
}

#[async_trait]
impl MailServiceTrait for LogMailService {
    async fn send_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<String, String> {
        let (subject, _) = compose_otp_message(code, purpose, self.otp_ttl_minutes);
        let message_id = format!("log-{}", Uuid::new_v4());
        info!(
            to = %mask_email(email),
            subject = %subject,
            code = %code,
            message_id = %message_id,
            "mail transport disabled, logging OTP instead"
        );
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_transport_always_succeeds() {
        let service = LogMailService::new(600);
        let id = service
            .send_otp("jane@example.com", "123456", OtpPurpose::Register)
            .await
            .unwrap();
        assert!(id.starts_with("log-"));
    }
}
