//! Mail transport configuration

use serde::{Deserialize, Serialize};

use super::{env_or, env_string};

/// Which transport delivers OTP mail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// JSON mail API over HTTPS
    Http,
    /// Writes messages to the log instead of sending them
    Log,
}

impl std::str::FromStr for MailProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" | "api" => Ok(MailProvider::Http),
            "log" | "console" => Ok(MailProvider::Log),
            _ => Err(format!("Invalid mail provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub provider: MailProvider,

    /// Endpoint that accepts `{from, to, subject, text}` JSON
    pub api_url: String,

    /// Bearer credential for the mail API
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Sender address
    pub from: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            api_url: String::from("https://api.mail.local/v1/send"),
            api_key: String::new(),
            from: String::from("no-reply@gigboard.local"),
            timeout_seconds: 10,
        }
    }
}

impl MailConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: env_or("MAIL_PROVIDER", defaults.provider),
            api_url: env_string("MAIL_API_URL", &defaults.api_url),
            api_key: env_string("MAIL_API_KEY", ""),
            from: env_string("MAIL_FROM", &defaults.from),
            timeout_seconds: env_or("MAIL_TIMEOUT_SECONDS", defaults.timeout_seconds),
        }
    }

    /// Check that the HTTP transport has what it needs
    pub fn is_http_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.api_key.is_empty()
    }
}
