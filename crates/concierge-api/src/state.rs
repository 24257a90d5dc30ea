//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use concierge_chat::{ConversationOrchestrator, VoiceIntake};
use concierge_core::config::ConciergeConfig;
use concierge_llm::{ProviderRegistry, SpeechToText};
use concierge_storage::{SqliteStore, StoreHandle};

/// Shared application state.
///
/// Everything is read-only after startup, so clones are cheap `Arc` copies.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConciergeConfig>,
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub voice: Arc<VoiceIntake>,
    /// Persistence handle; its availability is checked per request.
    pub store: StoreHandle,
    pub providers: Arc<ProviderRegistry>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the text and voice paths over one store and provider registry.
    pub fn new(
        config: ConciergeConfig,
        store: StoreHandle,
        providers: ProviderRegistry,
        stt: Arc<dyn SpeechToText>,
    ) -> Self {
        let providers = Arc::new(providers);
        let sqlite = Arc::new(SqliteStore::new(store.clone()));

        let orchestrator = ConversationOrchestrator::new(sqlite.clone(), providers.clone())
            .with_history_limit(config.storage.history_limit);
        let voice = VoiceIntake::new(stt, sqlite, providers.clone());

        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
            voice: Arc::new(voice),
            store,
            providers,
            start_time: Instant::now(),
        }
    }
}
