//! HTTP mail API transport
//!
//! Posts `{from, to, subject, text}` as JSON with a bearer key and reads the
//! provider's message id from the response. Rate limiting and server errors
//! are retried with exponential backoff; other client errors are not.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use gb_core::domain::entities::OtpPurpose;
use gb_core::services::MailServiceTrait;
use gb_shared::config::MailConfig;
use gb_shared::utils::email::mask_email;

use super::compose_otp_message;
use crate::InfrastructureError;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Serialize)]
pub(crate) struct OutboundMail<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(alias = "messageId", alias = "message_id")]
    id: Option<String>,
}

pub struct HttpMailService {
    client: Client,
    config: MailConfig,
    otp_ttl_minutes: i64,
}

impl HttpMailService {
    pub fn new(config: MailConfig, otp_ttl_seconds: i64) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()
            .map_err(InfrastructureError::Http)?;

        info!(api_url = %config.api_url, from = %config.from, "HTTP mail service initialized");

        Ok(Self {
            client,
            config,
            otp_ttl_minutes: (otp_ttl_seconds / 60).max(1),
        })
    }

    async fn send_with_retry(&self, mail: &OutboundMail<'_>) -> Result<String, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = Duration::from_millis(RETRY_DELAY_MS);

        loop {
            attempts += 1;
            debug!(attempt = attempts, to = %mask_email(mail.to), "Sending mail");

            match self.send_once(mail).await {
                Ok(id) => return Ok(id),
                Err(SendFailure::Retriable(message)) if attempts < MAX_ATTEMPTS => {
                    warn!(attempt = attempts, error = %message, retry_in = ?delay, "Mail API failed, retrying");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(SendFailure::Retriable(message)) | Err(SendFailure::Fatal(message)) => {
                    error!(attempts, error = %message, to = %mask_email(mail.to), "Mail API gave up");
                    return Err(InfrastructureError::Mail(message));
                }
            }
        }
    }

    async fn send_once(&self, mail: &OutboundMail<'_>) -> Result<String, SendFailure> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(mail)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SendFailure::Retriable(e.to_string())
                } else {
                    SendFailure::Fatal(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            // Providers that return no body still accepted the message
            let id = response
                .json::<SendResponse>()
                .await
                .ok()
                .and_then(|body| body.id)
                .unwrap_or_else(|| format!("http-{}", status.as_u16()));
            return Ok(id);
        }

        let body = response.text().await.unwrap_or_default();
        let message = format!("mail API returned {}: {}", status, body);
        if is_retriable_status(status) {
            Err(SendFailure::Retriable(message))
        } else {
            Err(SendFailure::Fatal(message))
        }
    }
}

enum SendFailure {
    Retriable(String),
    Fatal(String),
}

fn is_retriable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl MailServiceTrait for HttpMailService {
    async fn send_otp(&self, email: &str, code: &str, purpose: OtpPurpose) -> Result<String, String> {
        let (subject, text) = compose_otp_message(code, purpose, self.otp_ttl_minutes);
        let mail = OutboundMail {
            from: &self.config.from,
            to: email,
            subject: &subject,
            text: &text,
        };

        let id = self.send_with_retry(&mail).await.map_err(|e| e.to_string())?;
        info!(to = %mask_email(email), purpose = %purpose, message_id = %id, "OTP mail sent");
        Ok(id)
    }
}
