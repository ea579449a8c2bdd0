//! Background reaper for expired rows.
//!
//! Removes expired refresh sessions, expired OTP rows and unverified
//! principals past their verification deadline on a fixed interval.

use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use gb_shared::config::CleanupConfig;

use crate::errors::DomainError;
use crate::repositories::{OtpRepository, PrincipalRepository, SessionRepository};

#[derive(Debug, Clone)]
pub struct CleanupServiceConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    pub enabled: bool,
}

impl Default for CleanupServiceConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: true,
        }
    }
}

impl From<&CleanupConfig> for CleanupServiceConfig {
    fn from(cleanup: &CleanupConfig) -> Self {
        Self {
            interval_seconds: cleanup.interval_seconds.max(1),
            enabled: cleanup.enabled,
        }
    }
}

pub struct CleanupService<P, S, O>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
{
    principals: Arc<P>,
    sessions: Arc<S>,
    otps: Arc<O>,
    config: CleanupServiceConfig,
}

impl<P, S, O> CleanupService<P, S, O>
where
    P: PrincipalRepository + 'static,
    S: SessionRepository + 'static,
    O: OtpRepository + 'static,
{
    pub fn new(principals: Arc<P>, sessions: Arc<S>, otps: Arc<O>, config: CleanupServiceConfig) -> Self {
        Self {
            principals,
            sessions,
            otps,
            config,
        }
    }

    /// Run one cycle. Each sweep is independent: a failing sweep is recorded
    /// in `errors` and the others still run.
    pub async fn run_cleanup(&self) -> CleanupResult {
        let now = Utc::now();
        let mut result = CleanupResult::default();

        match self.sessions.delete_expired(now).await {
            Ok(count) => result.expired_sessions_deleted = count,
            Err(e) => record(&mut result, "session", e),
        }

        match self.otps.delete_expired(now).await {
            Ok(count) => result.expired_otps_deleted = count,
            Err(e) => record(&mut result, "otp", e),
        }

        match self.principals.delete_unverified_expired(now).await {
            Ok(count) => result.unverified_principals_deleted = count,
            Err(e) => record(&mut result, "unverified principal", e),
        }

        info!(
            sessions = result.expired_sessions_deleted,
            otps = result.expired_otps_deleted,
            principals = result.unverified_principals_deleted,
            "cleanup cycle completed"
        );
        result
    }

    /// Spawn the periodic loop. Returns `None` when cleanup is disabled.
    pub fn start_background_task(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("cleanup service is disabled");
            return None;
        }

        let period = std::time::Duration::from_secs(self.config.interval_seconds);
        Some(tokio::spawn(async move {
            info!(interval_seconds = self.config.interval_seconds, "cleanup service started");
            let mut timer = tokio::time::interval(period);
            loop {
                timer.tick().await;
                let result = self.run_cleanup().await;
                if !result.is_success() {
                    warn!(errors = ?result.errors, "cleanup completed with errors");
                }
            }
        }))
    }
}

fn record(result: &mut CleanupResult, sweep: &str, err: DomainError) {
    error!(sweep, error = %err, "cleanup sweep failed");
    result.errors.push(format!("{} cleanup error: {}", sweep, err));
}

/// Result of a cleanup cycle
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub expired_sessions_deleted: usize,
    pub expired_otps_deleted: usize,
    pub unverified_principals_deleted: usize,
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_cleaned(&self) -> usize {
        self.expired_sessions_deleted + self.expired_otps_deleted + self.unverified_principals_deleted
    }
}
