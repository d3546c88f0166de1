//! Account repository.
//!
//! Handles account registration and credential verification.

use super::DbError;
use super::sessions::{Session, insert_session};
use crate::security::password::{dummy_verify, hash_password, verify_password};
use crate::security::tokens::{USER_ID_LEN, random_token};
use sqlx::SqlitePool;

/// A registered account.
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: String,
    pub email: String,
}

/// Repository for account operations.
pub struct AccountRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new account and issue its first session.
    ///
    /// Uses a transaction so a failed session insert leaves no orphan account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        pepper: &str,
        session_ttl: chrono::Duration,
    ) -> Result<(Account, Session), DbError> {
        let password_hash = hash_password(password, pepper)?;
        let user_id = random_token(USER_ID_LEN);
        let now = chrono::Utc::now().timestamp();

        let mut tx = self.pool.begin().await?;

        // Insert account (UNIQUE NOCASE constraint will catch duplicates)
        sqlx::query(
            r#"
            INSERT INTO users (user_id, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user_id)
        .bind(email)
        .bind(&password_hash)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return DbError::AccountExists(email.to_string());
            }
            DbError::from(e)
        })?;

        let session = insert_session(&mut *tx, &user_id, session_ttl).await?;

        tx.commit().await?;

        Ok((
            Account {
                user_id,
                email: email.to_string(),
            },
            session,
        ))
    }

    /// Verify credentials and return the account if valid.
    ///
    /// An unknown e-mail still costs one password verification so response
    /// time does not reveal whether the account exists.
    pub async fn identify(
        &self,
        email: &str,
        password: &str,
        pepper: &str,
    ) -> Result<Account, DbError> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT user_id, email, password_hash
            FROM users
            WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some((user_id, email, password_hash)) = row else {
            dummy_verify(password);
            return Err(DbError::AccountNotFound(email.to_string()));
        };

        if !verify_password(password, &password_hash, pepper)? {
            return Err(DbError::InvalidPassword);
        }

        Ok(Account { user_id, email })
    }

    /// Find account by user ID.
    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<Account>, DbError> {
        let row = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT user_id, email
            FROM users
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(user_id, email)| Account { user_id, email }))
    }
}
