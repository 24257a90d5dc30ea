//! Repository implementations for SQLite-backed persistence.
//!
//! Provides InteractionRepository, FaqRepository, and VoiceRecordRepository
//! that operate on the Database struct using raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use concierge_core::error::ConciergeError;
use concierge_core::types::{FaqEntry, Interaction, Role, VoiceRecord};

use crate::db::Database;

/// Repository for conversation turns.
pub struct InteractionRepository {
    db: Arc<Database>,
}

impl InteractionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Append a turn.
    pub fn save(&self, interaction: &Interaction) -> Result<(), ConciergeError> {
        let meta = serde_json::to_string(&interaction.meta)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO interactions (id, conversation_id, role, text, meta, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    interaction.id.to_string(),
                    interaction.conversation_id,
                    interaction.role.as_str(),
                    interaction.text,
                    meta,
                    interaction.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| ConciergeError::Storage(format!("Failed to save interaction: {}", e)))?;
            Ok(())
        })
    }

    /// The most recent turns of a conversation, newest first.
    ///
    /// Turns sharing a timestamp come back in reverse insertion order.
    pub fn recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<Interaction>, ConciergeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, conversation_id, role, text, meta, created_at
                     FROM interactions
                     WHERE conversation_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![conversation_id, limit as i64], |row| {
                    Ok(row_to_interaction(row))
                })
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;

            let mut interactions = Vec::new();
            for row in rows {
                let interaction = row.map_err(|e| ConciergeError::Storage(e.to_string()))??;
                interactions.push(interaction);
            }
            Ok(interactions)
        })
    }

    /// Count turns stored for a conversation.
    pub fn count_for(&self, conversation_id: &str) -> Result<u64, ConciergeError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM interactions WHERE conversation_id = ?1",
                    rusqlite::params![conversation_id],
                    |row| row.get(0),
                )
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }

    /// Count all stored turns.
    pub fn count(&self) -> Result<u64, ConciergeError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM interactions", [], |row| row.get(0))
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

/// Repository for seeded FAQ reference data.
pub struct FaqRepository {
    db: Arc<Database>,
}

impl FaqRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Replace the whole FAQ table with `entries` in one transaction.
    pub fn replace_all(&self, entries: &[FaqEntry]) -> Result<usize, ConciergeError> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
            tx.execute("DELETE FROM faqs", [])
                .map_err(|e| ConciergeError::Storage(format!("Failed to clear faqs: {}", e)))?;
            {
                let mut stmt = tx
                    .prepare("INSERT INTO faqs (question, answer) VALUES (?1, ?2)")
                    .map_err(|e| ConciergeError::Storage(e.to_string()))?;
                for entry in entries {
                    stmt.execute(rusqlite::params![entry.question, entry.answer])
                        .map_err(|e| {
                            ConciergeError::Storage(format!("Failed to insert faq: {}", e))
                        })?;
                }
            }
            tx.commit()
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
            Ok(entries.len())
        })
    }

    /// FAQs whose question contains any of `keywords`, case-insensitively.
    ///
    /// Matching happens in Rust: SQLite's `lower()` folds ASCII only.
    pub fn find_by_keywords(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<FaqEntry>, ConciergeError> {
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let entries = self
            .list()?
            .into_iter()
            .filter(|entry| {
                let question = entry.question.to_lowercase();
                needles.iter().any(|n| question.contains(n.as_str()))
            })
            .take(limit)
            .collect();
        Ok(entries)
    }

    /// All FAQs in insertion order.
    pub fn list(&self) -> Result<Vec<FaqEntry>, ConciergeError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT question, answer FROM faqs ORDER BY id ASC")
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(FaqEntry {
                        question: row.get(0)?,
                        answer: row.get(1)?,
                    })
                })
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row.map_err(|e| ConciergeError::Storage(e.to_string()))?);
            }
            Ok(entries)
        })
    }
}

/// Repository for voice endpoint transcripts.
pub struct VoiceRecordRepository {
    db: Arc<Database>,
}

impl VoiceRecordRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn save(&self, record: &VoiceRecord) -> Result<(), ConciergeError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO voice_interactions (id, transcript, reply, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    record.id.to_string(),
                    record.transcript,
                    record.reply,
                    record.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| ConciergeError::Storage(format!("Failed to save voice record: {}", e)))?;
            Ok(())
        })
    }

    pub fn count(&self) -> Result<u64, ConciergeError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM voice_interactions", [], |row| {
                    row.get(0)
                })
                .map_err(|e| ConciergeError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

// =============================================================================
// Row mapping helpers
// =============================================================================

fn row_to_interaction(row: &rusqlite::Row) -> Result<Interaction, ConciergeError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| ConciergeError::Storage(e.to_string()))?;
    let conversation_id: String = row
        .get(1)
        .map_err(|e| ConciergeError::Storage(e.to_string()))?;
    let role_str: String = row
        .get(2)
        .map_err(|e| ConciergeError::Storage(e.to_string()))?;
    let text: String = row
        .get(3)
        .map_err(|e| ConciergeError::Storage(e.to_string()))?;
    let meta_str: String = row
        .get(4)
        .map_err(|e| ConciergeError::Storage(e.to_string()))?;
    let created_ms: i64 = row
        .get(5)
        .map_err(|e| ConciergeError::Storage(e.to_string()))?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| ConciergeError::Storage(format!("Invalid interaction id: {}", e)))?;
    let role: Role = role_str.parse()?;
    let meta = serde_json::from_str(&meta_str).unwrap_or_else(|_| serde_json::json!({}));

    Ok(Interaction {
        id,
        conversation_id,
        role,
        text,
        meta,
        created_at: millis_to_datetime(created_ms),
    })
}

fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}
