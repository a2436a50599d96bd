//! # Session Repository
//!
//! One row per issued access token, keyed by the token's `jti`.
//!
//! ```text
//! sign-in ──► create(jti, user, expires_at)
//! request ──► is_active(jti)     revoked_at IS NULL AND expires_at > now
//! sign-out ─► revoke(jti)        revoked_at = now
//! sweep ────► purge_inactive()   DELETE revoked or expired rows
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Records a newly issued token.
    pub async fn create(&self, jti: &str, user_id: &str, expires_at: DateTime<Utc>) -> DbResult<()> {
        debug!(user_id = %user_id, "Opening session");

        sqlx::query(
            "INSERT INTO sessions (id, user_id, created_at, expires_at, revoked_at) \
             VALUES (?1, ?2, ?3, ?4, NULL)",
        )
        .bind(jti)
        .bind(user_id)
        .bind(Utc::now())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether the token is known, unrevoked and unexpired.
    pub async fn is_active(&self, jti: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE id = ?1 AND revoked_at IS NULL AND expires_at > ?2",
        )
        .bind(jti)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Revokes a token. Returns whether it was active.
    pub async fn revoke(&self, jti: &str) -> DbResult<bool> {
        debug!("Revoking session");

        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = ?2 WHERE id = ?1 AND revoked_at IS NULL",
        )
        .bind(jti)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every active token of a user except `keep_jti`.
    /// Returns the revoked ids.
    pub async fn revoke_others(&self, user_id: &str, keep_jti: &str) -> DbResult<Vec<String>> {
        let revoked: Vec<String> = sqlx::query_scalar(
            "UPDATE sessions SET revoked_at = ?3 \
             WHERE user_id = ?1 AND id != ?2 AND revoked_at IS NULL RETURNING id",
        )
        .bind(user_id)
        .bind(keep_jti)
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id = %user_id, count = revoked.len(), "Revoked other sessions");
        Ok(revoked)
    }

    /// Ids of all unrevoked, unexpired tokens.
    pub async fn active_ids(&self) -> DbResult<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT id FROM sessions WHERE revoked_at IS NULL AND expires_at > ?1",
        )
        .bind(Utc::now())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    /// Deletes revoked rows and rows expired before `now`.
    /// Returns the number of rows deleted.
    pub async fn purge_inactive(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            "DELETE FROM sessions WHERE revoked_at IS NOT NULL OR expires_at <= ?1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
