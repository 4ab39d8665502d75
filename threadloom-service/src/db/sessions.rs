//! Session lookup against the table maintained by the auth frontend.

use chrono::Utc;
use rusqlite::params;

use super::{Database, models::SessionRecord};
use crate::error::{DatabaseError, ServiceResult};

const SELECT_SESSION: &str = "SELECT token_digest, user_id, name, email, role, expires_at, \
                              created_at FROM sessions WHERE token_digest = ?1";

impl Database {
    /// Look up a session by token digest, treating expired rows as absent.
    ///
    /// Expiry is checked here rather than in SQL so that rows written with
    /// differing timestamp formatting still compare correctly.
    pub fn find_session(&self, token_digest: &str) -> ServiceResult<Option<SessionRecord>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(SELECT_SESSION).map_err(DatabaseError::Query)?;
        let mut rows = stmt
            .query_map(params![token_digest], SessionRecord::from_row)
            .map_err(DatabaseError::Query)?;

        let record = match rows.next() {
            Some(row) => row.map_err(DatabaseError::Query)?,
            None => return Ok(None),
        };

        if record.expires_at <= Utc::now() {
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// Remove sessions whose expiry has passed, returning the count removed
    pub fn delete_expired_sessions(&self) -> ServiceResult<usize> {
        let conn = self.conn.lock().unwrap();

        let deleted = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![Utc::now().to_rfc3339()],
            )
            .map_err(DatabaseError::Query)?;

        Ok(deleted)
    }

    /// Session rows are written by the auth frontend in production; this
    /// helper seeds them for tests.
    #[cfg(test)]
    pub fn insert_session(
        &self,
        token_digest: &str,
        user_id: &str,
        name: &str,
        email: &str,
        role: crate::auth::Role,
        expires_at: chrono::DateTime<Utc>,
    ) -> ServiceResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO sessions (token_digest, user_id, name, email, role, expires_at, \
             created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token_digest,
                user_id,
                name,
                email,
                role.as_str(),
                expires_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(DatabaseError::Query)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Duration;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let db = Database::open(&dir.path().join("test.db")).expect("open db");
        (dir, db)
    }

    #[test]
    fn test_find_session_returns_live_row() {
        let (_dir, db) = test_db();
        db.insert_session(
            "digest-1",
            "user-1",
            "Ada",
            "ada@example.com",
            Role::Admin,
            Utc::now() + Duration::hours(1),
        )
        .expect("insert");

        let session = db.find_session("digest-1").expect("find").expect("present");
        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.role, Role::Admin);
    }

    #[test]
    fn test_find_session_treats_expired_as_absent() {
        let (_dir, db) = test_db();
        db.insert_session(
            "digest-2",
            "user-2",
            "Bea",
            "bea@example.com",
            Role::User,
            Utc::now() - Duration::minutes(5),
        )
        .expect("insert");

        assert!(db.find_session("digest-2").expect("find").is_none());
    }

    #[test]
    fn test_find_session_unknown_digest() {
        let (_dir, db) = test_db();
        assert!(db.find_session("missing").expect("find").is_none());
    }

    #[test]
    fn test_delete_expired_sessions_keeps_live_rows() {
        let (_dir, db) = test_db();
        db.insert_session(
            "stale",
            "user-1",
            "Ada",
            "ada@example.com",
            Role::User,
            Utc::now() - Duration::hours(2),
        )
        .expect("insert stale");
        db.insert_session(
            "live",
            "user-2",
            "Bea",
            "bea@example.com",
            Role::User,
            Utc::now() + Duration::hours(2),
        )
        .expect("insert live");

        let deleted = db.delete_expired_sessions().expect("sweep");
        assert_eq!(deleted, 1);
        assert!(db.find_session("live").expect("find").is_some());
    }
}
