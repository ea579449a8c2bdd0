//! MySQL implementation of the OtpRepository trait.
//!
//! The generated `pending_key` column is unique while a row is unconsumed,
//! which gives the one-pending-code-per-key guarantee and lets a new request
//! overwrite the pending row through ON DUPLICATE KEY UPDATE.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use gb_core::domain::entities::{OtpKey, OtpPurpose, OtpToken};
use gb_core::errors::DomainError;
use gb_core::repositories::OtpRepository;

use super::{column, query_failed, uuid_column};

const OTP_COLUMNS: &str = r#"
    id, principal_id, email, purpose, code_hash, consumed, attempts,
    expires_at, created_at, updated_at
"#;

/// MySQL implementation of OtpRepository
pub struct MySqlOtpRepository {
    pool: MySqlPool,
}

impl MySqlOtpRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_otp(row: &MySqlRow) -> Result<OtpToken, DomainError> {
        let purpose: String = column(row, "purpose")?;

        Ok(OtpToken {
            id: uuid_column(row, "id")?,
            principal_id: uuid_column(row, "principal_id")?,
            email: column(row, "email")?,
            purpose: purpose
                .parse::<OtpPurpose>()
                .map_err(DomainError::persistence)?,
            code_hash: column(row, "code_hash")?,
            consumed: column(row, "consumed")?,
            attempts: column(row, "attempts")?,
            expires_at: column(row, "expires_at")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    /// Unconsumed row for the key regardless of expiry
    async fn find_unconsumed(&self, key: &OtpKey) -> Result<Option<OtpToken>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM otp_tokens
            WHERE principal_id = ? AND purpose = ? AND email = ? AND consumed = FALSE
            LIMIT 1
            "#,
            OTP_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(key.principal_id.to_string())
            .bind(key.purpose.as_str())
            .bind(&key.email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find otp", e))?;

        row.as_ref().map(Self::row_to_otp).transpose()
    }
}

#[async_trait]
impl OtpRepository for MySqlOtpRepository {
    async fn upsert_pending(&self, token: OtpToken) -> Result<OtpToken, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO otp_tokens (
                id, principal_id, email, purpose, code_hash, consumed, attempts,
                expires_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, FALSE, 0, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                code_hash = VALUES(code_hash),
                attempts = 0,
                expires_at = VALUES(expires_at),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(token.id.to_string())
        .bind(token.principal_id.to_string())
        .bind(&token.email)
        .bind(token.purpose.as_str())
        .bind(&token.code_hash)
        .bind(token.expires_at)
        .bind(token.created_at)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("upsert otp", e))?;

        // The surviving row keeps its original id when it was overwritten
        self.find_unconsumed(&token.key())
            .await?
            .ok_or_else(|| DomainError::persistence("otp row missing after upsert"))
    }

    async fn find_pending(&self, key: &OtpKey) -> Result<Option<OtpToken>, DomainError> {
        Ok(self
            .find_unconsumed(key)
            .await?
            .filter(|token| token.is_pending_at(Utc::now())))
    }

    async fn increment_attempts(&self, id: Uuid) -> Result<Option<u32>, DomainError> {
        // LAST_INSERT_ID(expr) hands the new counter back on the same statement
        let result = sqlx::query(
            r#"
            UPDATE otp_tokens
            SET attempts = LAST_INSERT_ID(attempts + 1), updated_at = ?
            WHERE id = ? AND consumed = FALSE
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("increment otp attempts", e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(result.last_insert_id() as u32))
    }

    async fn mark_consumed(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE otp_tokens SET consumed = TRUE, updated_at = ? WHERE id = ? AND consumed = FALSE",
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("consume otp", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM otp_tokens WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete otp", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM otp_tokens WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete expired otps", e))?;

        Ok(result.rows_affected() as usize)
    }
}
