//! Authentication configuration: token signing, refresh cookie, OTP and
//! password hashing settings.

use serde::{Deserialize, Serialize};

use super::{env_or, env_string, Environment};

const DEFAULT_ACCESS_SECRET: &str = "dev-access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "dev-refresh-secret-change-in-production";

/// JWT signing configuration. Access and refresh tokens are signed with
/// different secrets so one can never be presented as the other.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret for short-lived access tokens
    pub access_secret: String,

    /// Secret for long-lived refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: DEFAULT_ACCESS_SECRET.to_string(),
            refresh_secret: DEFAULT_REFRESH_SECRET.to_string(),
            access_token_expiry: 900,      // 15 minutes
            refresh_token_expiry: 604_800, // 7 days
            issuer: String::from("gigboard"),
            audience: String::from("gigboard-api"),
        }
    }
}

impl JwtConfig {
    /// Create a configuration with explicit secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_secret: env_string("JWT_ACCESS_SECRET", DEFAULT_ACCESS_SECRET),
            refresh_secret: env_string("JWT_REFRESH_SECRET", DEFAULT_REFRESH_SECRET),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            issuer: env_string("JWT_ISSUER", &defaults.issuer),
            audience: env_string("JWT_AUDIENCE", &defaults.audience),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86_400;
        self
    }

    /// Check if either secret is still the development default
    pub fn is_using_default_secrets(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }
}

/// Refresh cookie attributes. The path is scoped to the auth endpoints so
/// the browser never attaches the refresh token to general API calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// SameSite attribute: `Strict`, `Lax` or `None`
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: String::from("refresh_token"),
            path: String::from("/api/v1/auth"),
            secure: false,
            http_only: true,
            same_site: String::from("Strict"),
        }
    }
}

impl CookieConfig {
    pub fn for_environment(env: Environment) -> Self {
        Self {
            secure: !env.is_development(),
            ..Default::default()
        }
    }

    pub fn from_env(env: Environment) -> Self {
        let defaults = Self::for_environment(env);
        Self {
            name: env_string("REFRESH_COOKIE_NAME", &defaults.name),
            secure: env_or("REFRESH_COOKIE_SECURE", defaults.secure),
            same_site: env_string("REFRESH_COOKIE_SAME_SITE", &defaults.same_site),
            ..defaults
        }
    }
}

/// One-time code settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Lifetime of a pending code in seconds
    pub ttl_seconds: i64,

    /// Window in which repeated requests are silently absorbed
    pub resend_cooldown_seconds: u64,

    /// Wrong guesses allowed before the code is destroyed
    pub max_attempts: u32,

    /// Number of digits in a generated code
    pub code_length: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 600,
            resend_cooldown_seconds: 30,
            max_attempts: 5,
            code_length: 6,
        }
    }
}

impl OtpConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_seconds: env_or("OTP_TTL_SECONDS", defaults.ttl_seconds),
            resend_cooldown_seconds: env_or(
                "OTP_RESEND_COOLDOWN_SECONDS",
                defaults.resend_cooldown_seconds,
            ),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            code_length: defaults.code_length,
        }
    }
}

/// Password hashing and account verification settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordConfig {
    /// bcrypt work factor, shared by password and OTP hashing
    pub bcrypt_cost: u32,

    /// Hours an unverified account survives before the reaper removes it
    pub verification_grace_hours: i64,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 12,
            verification_grace_hours: 24,
        }
    }
}

impl PasswordConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost).clamp(4, 31),
            verification_grace_hours: env_or(
                "VERIFICATION_GRACE_HOURS",
                defaults.verification_grace_hours,
            ),
        }
    }
}

/// Background reaper settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
        }
    }
}

impl CleanupConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_or("CLEANUP_ENABLED", defaults.enabled),
            interval_seconds: env_or("CLEANUP_INTERVAL_SECONDS", defaults.interval_seconds).max(1),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub otp: OtpConfig,
    pub password: PasswordConfig,
    pub cleanup: CleanupConfig,
}

impl AuthConfig {
    pub fn for_environment(env: Environment) -> Self {
        Self {
            jwt: JwtConfig::default(),
            cookie: CookieConfig::for_environment(env),
            otp: OtpConfig::default(),
            password: PasswordConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }

    pub fn from_env(env: Environment) -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            cookie: CookieConfig::from_env(env),
            otp: OtpConfig::from_env(),
            password: PasswordConfig::from_env(),
            cleanup: CleanupConfig::from_env(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}
