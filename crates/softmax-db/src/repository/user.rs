//! # User Repository
//!
//! Accounts and profiles. Only stores password hashes; hashing and
//! verification live in the API's auth module.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};
use softmax_core::UserProfile;

const SELECT_PROFILE: &str =
    "SELECT id, name, email, avatar_url, created_at, updated_at FROM users";

/// A profile together with its password hash. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAccount {
    #[sqlx(flatten)]
    pub profile: UserProfile,
    pub password_hash: String,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates an account.
    ///
    /// `email` must already be normalized (trimmed, lowercase).
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, name: &str, email: &str, password_hash: &str) -> DbResult<UserProfile> {
        let now = Utc::now();
        let profile = UserProfile {
            id: generate_id(),
            name: name.to_string(),
            email: email.to_string(),
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %profile.id, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, avatar_url, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6)
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(password_hash)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
            other => other,
        })?;

        Ok(profile)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<UserProfile>> {
        let sql = format!("{} WHERE id = ?1", SELECT_PROFILE);
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Looks up an account by (normalized) email, for sign-in.
    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<UserAccount>> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, name, email, avatar_url, created_at, updated_at, password_hash
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Looks up an account by id, for password changes.
    pub async fn get_account(&self, id: &str) -> DbResult<Option<UserAccount>> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"
            SELECT id, name, email, avatar_url, created_at, updated_at, password_hash
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Updates name, email and avatar.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email taken by another account
    pub async fn update_profile(
        &self,
        id: &str,
        name: &str,
        email: &str,
        avatar_url: Option<&str>,
    ) -> DbResult<UserProfile> {
        debug!(id = %id, "Updating user profile");

        let result = sqlx::query(
            "UPDATE users SET name = ?2, email = ?3, avatar_url = ?4, updated_at = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(avatar_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, email),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    pub async fn update_password_hash(&self, id: &str, password_hash: &str) -> DbResult<()> {
        debug!(id = %id, "Updating user password");

        let result = sqlx::query("UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{database, user};
    use crate::DbError;

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = database().await;
        user(&db, "caixa@softmax.co.mz").await;

        let err = db
            .users()
            .insert("Outro", "caixa@softmax.co.mz", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "caixa@softmax.co.mz"));

        let other = user(&db, "gerente@softmax.co.mz").await;
        let err = db
            .users()
            .update_profile(&other.id, "Gerente", "caixa@softmax.co.mz", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_profile_and_password_updates() {
        let db = database().await;
        let profile = user(&db, "ana@softmax.co.mz").await;

        let updated = db
            .users()
            .update_profile(
                &profile.id,
                "Ana Maria",
                "ana.maria@softmax.co.mz",
                Some("https://cdn/ana.png"),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Maria");
        assert_eq!(updated.email, "ana.maria@softmax.co.mz");
        assert_eq!(updated.avatar_url.as_deref(), Some("https://cdn/ana.png"));

        db.users()
            .update_password_hash(&profile.id, "new-hash")
            .await
            .unwrap();
        let account = db
            .users()
            .find_by_email("ana.maria@softmax.co.mz")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.password_hash, "new-hash");
        assert_eq!(account.profile.id, profile.id);
    }
}
