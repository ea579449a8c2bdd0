//! MySQL implementation of the SessionRepository trait.
//!
//! Every state change is a single conditional UPDATE so concurrent refreshes
//! of the same token race on the row, not in application code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use gb_core::domain::entities::{PrincipalType, RefreshSession, RevocationReason};
use gb_core::errors::DomainError;
use gb_core::repositories::SessionRepository;

use super::{column, query_failed, uuid_column};

const SESSION_COLUMNS: &str = r#"
    id, principal_id, principal_type, jti, expires_at, revoked,
    revoked_reason, revoked_at, ip, user_agent, created_at
"#;

/// MySQL implementation of SessionRepository
pub struct MySqlSessionRepository {
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &MySqlRow) -> Result<RefreshSession, DomainError> {
        let principal_type: String = column(row, "principal_type")?;
        let revoked_reason: Option<String> = column(row, "revoked_reason")?;

        Ok(RefreshSession {
            id: uuid_column(row, "id")?,
            principal_id: uuid_column(row, "principal_id")?,
            principal_type: principal_type
                .parse::<PrincipalType>()
                .map_err(DomainError::persistence)?,
            jti: column(row, "jti")?,
            expires_at: column(row, "expires_at")?,
            revoked: column(row, "revoked")?,
            revoked_reason: revoked_reason
                .map(|r| r.parse::<RevocationReason>())
                .transpose()
                .map_err(DomainError::persistence)?,
            revoked_at: column(row, "revoked_at")?,
            ip: column(row, "ip")?,
            user_agent: column(row, "user_agent")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: RefreshSession) -> Result<RefreshSession, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_sessions (
                id, principal_id, principal_type, jti, expires_at, revoked,
                revoked_reason, revoked_at, ip, user_agent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.id.to_string())
        .bind(session.principal_id.to_string())
        .bind(session.principal_type.as_str())
        .bind(&session.jti)
        .bind(session.expires_at)
        .bind(session.revoked)
        .bind(session.revoked_reason.map(|r| r.as_str()))
        .bind(session.revoked_at)
        .bind(session.ip.as_deref())
        .bind(session.user_agent.as_deref())
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("insert refresh session", e))?;

        Ok(session)
    }

    async fn find_active(
        &self,
        jti: &str,
        principal_id: Uuid,
    ) -> Result<Option<RefreshSession>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM refresh_sessions
            WHERE jti = ? AND principal_id = ? AND revoked = FALSE AND expires_at > ?
            LIMIT 1
            "#,
            SESSION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(jti)
            .bind(principal_id.to_string())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| query_failed("find active session", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn revoke_if_active(
        &self,
        jti: &str,
        principal_id: Uuid,
        reason: RevocationReason,
    ) -> Result<bool, DomainError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked = TRUE, revoked_reason = ?, revoked_at = ?
            WHERE jti = ? AND principal_id = ? AND revoked = FALSE AND expires_at > ?
            "#,
        )
        .bind(reason.as_str())
        .bind(now)
        .bind(jti)
        .bind(principal_id.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("revoke session", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_principal(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
        reason: RevocationReason,
    ) -> Result<usize, DomainError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE refresh_sessions
            SET revoked = TRUE, revoked_reason = ?, revoked_at = ?
            WHERE principal_id = ? AND principal_type = ? AND revoked = FALSE AND expires_at > ?
            "#,
        )
        .bind(reason.as_str())
        .bind(now)
        .bind(principal_id.to_string())
        .bind(principal_type.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| query_failed("revoke all sessions", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_active_by_principal(
        &self,
        principal_id: Uuid,
        principal_type: PrincipalType,
    ) -> Result<Vec<RefreshSession>, DomainError> {
        let query = format!(
            r#"
            SELECT {}
            FROM refresh_sessions
            WHERE principal_id = ? AND principal_type = ? AND revoked = FALSE AND expires_at > ?
            ORDER BY created_at DESC
            "#,
            SESSION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(principal_id.to_string())
            .bind(principal_type.as_str())
            .bind(Utc::now())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_failed("list active sessions", e))?;

        rows.iter().map(Self::row_to_session).collect()
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM refresh_sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| query_failed("delete expired sessions", e))?;

        Ok(result.rows_affected() as usize)
    }
}
