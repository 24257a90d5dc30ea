//! Best-effort side effects.
//!
//! Writes on the request path never fail the request. Each attempt resolves
//! to a [`PersistOutcome`] that is logged the same way everywhere.

use serde_json::Value;
use tracing::{debug, info, warn};

use concierge_core::error::ConciergeError;
use concierge_core::types::{Interaction, Role, VoiceRecord};
use concierge_storage::{HistoryStore, VoiceStore};

const STORE_UNAVAILABLE: &str = "store unavailable";

#[derive(Debug)]
pub enum PersistOutcome {
    Persisted,
    Skipped(String),
    Failed(ConciergeError),
}

impl PersistOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, PersistOutcome::Persisted)
    }

    /// Log the outcome under `what` and hand it back.
    pub fn log(self, what: &str) -> Self {
        match &self {
            PersistOutcome::Persisted => debug!(what, "Persisted"),
            PersistOutcome::Skipped(reason) => info!(what, reason = %reason, "Skipped persistence"),
            PersistOutcome::Failed(e) => warn!(what, error = %e, "Persistence failed"),
        }
        self
    }
}

impl From<Result<(), ConciergeError>> for PersistOutcome {
    fn from(result: Result<(), ConciergeError>) -> Self {
        match result {
            Ok(()) => PersistOutcome::Persisted,
            Err(e) => PersistOutcome::Failed(e),
        }
    }
}

/// Append one turn if the store is reachable right now.
pub async fn append_turn(
    store: &dyn HistoryStore,
    conversation_id: &str,
    role: Role,
    text: &str,
    meta: Option<Value>,
) -> PersistOutcome {
    if !store.is_available() {
        return PersistOutcome::Skipped(STORE_UNAVAILABLE.to_string());
    }
    let interaction = match Interaction::new(conversation_id, role, text) {
        Ok(i) => match meta {
            Some(meta) => i.with_meta(meta),
            None => i,
        },
        Err(e) => return PersistOutcome::Failed(e),
    };
    store.append(&interaction).await.into()
}

/// Record a voice exchange if the store is reachable right now.
pub async fn record_voice(store: &dyn VoiceStore, record: &VoiceRecord) -> PersistOutcome {
    if !store.is_available() {
        return PersistOutcome::Skipped(STORE_UNAVAILABLE.to_string());
    }
    store.record_voice(record).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_turn_persists() {
        let store = MemoryStore::new();
        let outcome = append_turn(&store, "c1", Role::User, "hello", None).await;
        assert!(outcome.is_persisted());
        assert_eq!(store.turns().len(), 1);
        assert_eq!(store.turns()[0].meta, json!({}));
    }

    #[tokio::test]
    async fn test_append_turn_attaches_meta() {
        let store = MemoryStore::new();
        append_turn(&store, "c1", Role::Assistant, "hi", Some(json!({"source": "faq"}))).await;
        assert_eq!(store.turns()[0].meta["source"], "faq");
    }

    #[tokio::test]
    async fn test_append_turn_skipped_when_unavailable() {
        let store = MemoryStore::unavailable();
        let outcome = append_turn(&store, "c1", Role::User, "hello", None).await;
        assert!(matches!(outcome, PersistOutcome::Skipped(_)));
        assert!(store.turns().is_empty());
    }

    #[tokio::test]
    async fn test_append_turn_failed_write() {
        let store = MemoryStore::failing_writes();
        let outcome = append_turn(&store, "c1", Role::User, "hello", None).await;
        assert!(matches!(outcome, PersistOutcome::Failed(ConciergeError::Storage(_))));
    }

    #[tokio::test]
    async fn test_append_turn_rejects_blank_conversation() {
        let store = MemoryStore::new();
        let outcome = append_turn(&store, "  ", Role::User, "hello", None).await;
        assert!(matches!(outcome, PersistOutcome::Failed(ConciergeError::Validation(_))));
        assert!(store.turns().is_empty());
    }

    #[tokio::test]
    async fn test_record_voice() {
        let store = MemoryStore::new();
        let outcome = record_voice(&store, &VoiceRecord::new("hi", "hello")).await;
        assert!(outcome.log("voice record").is_persisted());
        assert_eq!(store.voice_records().len(), 1);

        let store = MemoryStore::unavailable();
        let outcome = record_voice(&store, &VoiceRecord::new("hi", "hello")).await;
        assert!(matches!(outcome, PersistOutcome::Skipped(_)));
    }
}
