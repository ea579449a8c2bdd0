//! MySQL repository implementations

mod otp_repository_impl;
mod principal_repository_impl;
mod session_repository_impl;

pub use otp_repository_impl::MySqlOtpRepository;
pub use principal_repository_impl::MySqlPrincipalRepository;
pub use session_repository_impl::MySqlSessionRepository;

use gb_core::errors::DomainError;
use sqlx::{mysql::MySqlRow, Row};
use uuid::Uuid;

/// Map a driver error to the domain, logging the statement context
pub(crate) fn query_failed(context: &str, e: sqlx::Error) -> DomainError {
    tracing::error!(error = %e, context, "database query failed");
    DomainError::persistence(format!("{}: {}", context, e))
}

/// Read a typed column, naming it in the error
pub(crate) fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::persistence(format!("Failed to get {}: {}", name, e)))
}

/// UUIDs are stored as CHAR(36)
pub(crate) fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| DomainError::persistence(format!("Invalid UUID in {}: {}", name, e)))
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}
