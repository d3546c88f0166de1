//! Session repository.
//!
//! Sessions are opaque bearer tokens bound to a user, valid until `expiry`
//! (unix seconds).

use super::DbError;
use crate::security::tokens::{SESSION_ID_LEN, random_token};
use sqlx::{Sqlite, SqlitePool};

/// An issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub expiry: i64,
    pub created_at: i64,
}

impl Session {
    /// A session is valid strictly before its expiry.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expiry
    }
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a new session for `user_id` lasting `ttl`.
    pub async fn create(&self, user_id: &str, ttl: chrono::Duration) -> Result<Session, DbError> {
        insert_session(self.pool, user_id, ttl).await
    }

    /// Look up a session by its identifier.
    pub async fn find(&self, session_id: &str) -> Result<Option<Session>, DbError> {
        let row = sqlx::query_as::<_, (String, String, i64, i64)>(
            r#"
            SELECT session_id, user_id, expiry, created_at
            FROM sessions
            WHERE session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(session_id, user_id, expiry, created_at)| Session {
            session_id,
            user_id,
            expiry,
            created_at,
        }))
    }

    /// Delete a session. Returns whether a session was removed.
    pub async fn delete(&self, session_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every session that expired at or before `now`.
    pub async fn prune_expired(&self, now: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expiry <= ?")
            .bind(now)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Count sessions that are still valid at `now`.
    pub async fn count_active(&self, now: i64) -> Result<i64, DbError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions WHERE expiry > ?")
            .bind(now)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

/// Insert a fresh session through any SQLite executor (pool or transaction).
pub(super) async fn insert_session<'e, E>(
    executor: E,
    user_id: &str,
    ttl: chrono::Duration,
) -> Result<Session, DbError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = chrono::Utc::now();
    let expiry = now
        .checked_add_signed(ttl)
        .ok_or(DbError::SessionTtlOutOfRange)?;
    let session = Session {
        session_id: random_token(SESSION_ID_LEN),
        user_id: user_id.to_string(),
        expiry: expiry.timestamp(),
        created_at: now.timestamp(),
    };

    sqlx::query(
        r#"
        INSERT INTO sessions (session_id, user_id, expiry, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&session.session_id)
    .bind(&session.user_id)
    .bind(session.expiry)
    .bind(session.created_at)
    .execute(executor)
    .await?;

    Ok(session)
}

#[cfg(test)]
mod tests {
    use crate::db::{Database, DbError};

    const PEPPER: &str = "test-pepper";

    async fn db_with_user() -> (Database, String) {
        let db = Database::new(":memory:").await.unwrap();
        let (account, _) = db
            .accounts()
            .register("user@example.com", "password123", PEPPER, chrono::Duration::days(1))
            .await
            .unwrap();
        (db, account.user_id)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let (db, user_id) = db_with_user().await;

        let session = db
            .sessions()
            .create(&user_id, chrono::Duration::days(30))
            .await
            .unwrap();
        assert_eq!(session.session_id.len(), 64);
        assert_eq!(session.expiry - session.created_at, 30 * 86_400);

        let found = db.sessions().find(&session.session_id).await.unwrap().unwrap();
        assert_eq!(found.user_id, user_id);
        assert_eq!(found.expiry, session.expiry);
        assert!(!found.is_expired_at(chrono::Utc::now().timestamp()));
    }

    #[tokio::test]
    async fn test_find_unknown_session() {
        let (db, _) = db_with_user().await;
        assert!(db.sessions().find("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, user_id) = db_with_user().await;
        let session = db
            .sessions()
            .create(&user_id, chrono::Duration::days(1))
            .await
            .unwrap();

        assert!(db.sessions().delete(&session.session_id).await.unwrap());
        assert!(!db.sessions().delete(&session.session_id).await.unwrap());
        assert!(db.sessions().find(&session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let (db, user_id) = db_with_user().await;
        let expired = db
            .sessions()
            .create(&user_id, chrono::Duration::seconds(-10))
            .await
            .unwrap();
        let live = db
            .sessions()
            .create(&user_id, chrono::Duration::days(1))
            .await
            .unwrap();

        let now = chrono::Utc::now().timestamp();
        assert_eq!(db.sessions().prune_expired(now).await.unwrap(), 1);
        assert!(db.sessions().find(&expired.session_id).await.unwrap().is_none());
        assert!(db.sessions().find(&live.session_id).await.unwrap().is_some());
        // Registration issued a live session as well.
        assert_eq!(db.sessions().count_active(now).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ttl_out_of_range_is_an_error() {
        let (db, user_id) = db_with_user().await;

        let century = db
            .sessions()
            .create(&user_id, chrono::Duration::days(36_500))
            .await
            .unwrap();
        assert!(century.expiry > chrono::Utc::now().timestamp());

        let err = db
            .sessions()
            .create(&user_id, chrono::Duration::days(100_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::SessionTtlOutOfRange));
    }

    #[tokio::test]
    async fn test_register_with_overflowing_ttl_leaves_no_account() {
        let db = Database::new(":memory:").await.unwrap();
        let err = db
            .accounts()
            .register("far@example.com", "password123", PEPPER, chrono::Duration::days(100_000_000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::SessionTtlOutOfRange));

        let err = db
            .accounts()
            .identify("far@example.com", "password123", PEPPER)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::AccountNotFound(_)));
    }

    #[test]
    fn test_expiry_boundary() {
        let session = super::Session {
            session_id: "s".into(),
            user_id: "u".into(),
            expiry: 100,
            created_at: 0,
        };
        assert!(!session.is_expired_at(99));
        assert!(session.is_expired_at(100));
        assert!(session.is_expired_at(101));
    }
}
