//! Store traits consumed by the chat layer, and their SQLite implementation.
//!
//! Availability is checked on every call: the connection can come and go
//! between requests, so callers never cache it.

use async_trait::async_trait;
use tracing::warn;

use concierge_core::error::ConciergeError;
use concierge_core::types::{FaqEntry, Interaction, VoiceRecord};

use crate::db::StoreHandle;
use crate::repository::{FaqRepository, InteractionRepository, VoiceRecordRepository};

/// Append/query access to conversation turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Whether the backing store can currently be reached.
    fn is_available(&self) -> bool;

    /// Append one turn.
    async fn append(&self, interaction: &Interaction) -> Result<(), ConciergeError>;

    /// Up to `limit` turns of a conversation, newest first.
    ///
    /// Returns an empty list when the store is unavailable or the read fails.
    async fn recent(&self, conversation_id: &str, limit: usize) -> Vec<Interaction>;
}

/// FAQ lookup and transcript logging for the voice path.
#[async_trait]
pub trait VoiceStore: Send + Sync {
    fn is_available(&self) -> bool;

    /// FAQs whose question contains any keyword, at most `limit`.
    async fn find_faqs(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<FaqEntry>, ConciergeError>;

    async fn record_voice(&self, record: &VoiceRecord) -> Result<(), ConciergeError>;
}

/// SQLite-backed implementation of both store traits.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    handle: StoreHandle,
}

impl SqliteStore {
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &StoreHandle {
        &self.handle
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn is_available(&self) -> bool {
        self.handle.is_available()
    }

    async fn append(&self, interaction: &Interaction) -> Result<(), ConciergeError> {
        let db = self.handle.require()?;
        InteractionRepository::new(db.clone()).save(interaction)
    }

    async fn recent(&self, conversation_id: &str, limit: usize) -> Vec<Interaction> {
        if conversation_id.is_empty() || !self.handle.is_available() {
            return Vec::new();
        }
        let Some(db) = self.handle.database() else {
            return Vec::new();
        };
        match InteractionRepository::new(db.clone()).recent(conversation_id, limit) {
            Ok(turns) => turns,
            Err(e) => {
                warn!(conversation_id, error = %e, "Could not load interactions");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl VoiceStore for SqliteStore {
    fn is_available(&self) -> bool {
        self.handle.is_available()
    }

    async fn find_faqs(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<FaqEntry>, ConciergeError> {
        let db = self.handle.require()?;
        FaqRepository::new(db.clone()).find_by_keywords(keywords, limit)
    }

    async fn record_voice(&self, record: &VoiceRecord) -> Result<(), ConciergeError> {
        let db = self.handle.require()?;
        VoiceRecordRepository::new(db.clone()).save(record)
    }
}
