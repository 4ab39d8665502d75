//! Database schema migrations.
//!
//! This module contains all database migrations and schema setup.

use rusqlite::Connection;

use crate::error::{DatabaseError, ServiceResult};

/// Run all database migrations.
///
/// This function is called during database initialization to ensure
/// the schema is up to date.
pub(super) fn run_migrations(conn: &Connection) -> ServiceResult<()> {
    // Initial schema setup
    conn.execute_batch(
        r#"
        -- Singleton settings record. The singleton column makes a second row
        -- impossible: every insert carries 1 and the column is UNIQUE.
        CREATE TABLE IF NOT EXISTS settings (
            id TEXT PRIMARY KEY,
            singleton INTEGER NOT NULL UNIQUE DEFAULT 1 CHECK (singleton = 1),
            general TEXT NOT NULL DEFAULT '{}',
            account TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        -- Sessions are written by the external auth authority; this service
        -- only resolves them by token digest.
        CREATE TABLE IF NOT EXISTS sessions (
            token_digest TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at);
    "#,
    )
    .map_err(|e| DatabaseError::Migration {
        message: e.to_string(),
    })?;

    // SQLite doesn't have IF NOT EXISTS for ALTER TABLE, so we check if
    // columns exist before adding them
    run_session_role_migration(conn)?;

    Ok(())
}

/// Migration: Add role column to sessions (databases created before roles)
fn run_session_role_migration(conn: &Connection) -> ServiceResult<()> {
    let has_role: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('sessions') WHERE name='role'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0)
        > 0;

    if !has_role {
        conn.execute(
            "ALTER TABLE sessions ADD COLUMN role TEXT NOT NULL DEFAULT 'user'",
            [],
        )
        .map_err(|e| DatabaseError::Migration {
            message: format!("Failed to add role column: {}", e),
        })?;
    }

    Ok(())
}
