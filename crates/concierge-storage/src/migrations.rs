//! Database schema migrations.
//!
//! Applies the initial schema: interactions, faqs, voice_interactions,
//! and the schema_migrations tracking table.

use rusqlite::Connection;
use tracing::info;

use concierge_core::error::ConciergeError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), ConciergeError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| ConciergeError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| ConciergeError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<(), ConciergeError> {
    conn.execute_batch(
        "
        -- Conversation turns. Append-only.
        CREATE TABLE IF NOT EXISTS interactions (
            id              TEXT PRIMARY KEY NOT NULL,
            conversation_id TEXT NOT NULL CHECK (length(conversation_id) > 0),
            role            TEXT NOT NULL
                            CHECK (role IN ('user', 'assistant', 'system')),
            text            TEXT NOT NULL,
            meta            TEXT NOT NULL DEFAULT '{}',
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_interactions_conversation
            ON interactions (conversation_id, created_at DESC);

        -- Seeded reference data for the voice path.
        CREATE TABLE IF NOT EXISTS faqs (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            question        TEXT NOT NULL,
            answer          TEXT NOT NULL
        );

        -- Transcript/reply pairs from the voice endpoint.
        CREATE TABLE IF NOT EXISTS voice_interactions (
            id              TEXT PRIMARY KEY NOT NULL,
            transcript      TEXT NOT NULL,
            reply           TEXT NOT NULL,
            created_at      INTEGER NOT NULL
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| ConciergeError::Storage(format!("Migration v1 failed: {}", e)))?;

    Ok(())
}
