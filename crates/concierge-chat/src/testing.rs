//! In-memory stores and scripted providers for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use concierge_core::error::ConciergeError;
use concierge_core::types::{FaqEntry, Interaction, VoiceRecord};
use concierge_llm::{GenerateRequest, LlmProvider, ProviderError, SpeechToText};
use concierge_storage::{HistoryStore, VoiceStore};

#[derive(Default)]
pub struct MemoryStore {
    available: AtomicBool,
    fail_writes: bool,
    fail_reads: bool,
    turns: Mutex<Vec<Interaction>>,
    voice: Mutex<Vec<VoiceRecord>>,
    faqs: Vec<FaqEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::new()
        }
    }

    pub fn with_faqs(faqs: Vec<FaqEntry>) -> Self {
        Self {
            faqs,
            ..Self::new()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn turns(&self) -> Vec<Interaction> {
        self.turns.lock().unwrap().clone()
    }

    pub fn voice_records(&self) -> Vec<VoiceRecord> {
        self.voice.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn append(&self, interaction: &Interaction) -> Result<(), ConciergeError> {
        if self.fail_writes {
            return Err(ConciergeError::Storage("disk full".to_string()));
        }
        self.turns.lock().unwrap().push(interaction.clone());
        Ok(())
    }

    async fn recent(&self, conversation_id: &str, limit: usize) -> Vec<Interaction> {
        if !self.available.load(Ordering::SeqCst) || self.fail_reads {
            return Vec::new();
        }
        self.turns
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|t| t.conversation_id == conversation_id)
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl VoiceStore for MemoryStore {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn find_faqs(
        &self,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<FaqEntry>, ConciergeError> {
        if self.fail_reads {
            return Err(ConciergeError::Storage("faq table missing".to_string()));
        }
        Ok(self
            .faqs
            .iter()
            .filter(|f| {
                let q = f.question.to_lowercase();
                keywords.iter().any(|k| q.contains(k.as_str()))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn record_voice(&self, record: &VoiceRecord) -> Result<(), ConciergeError> {
        if self.fail_writes {
            return Err(ConciergeError::Storage("disk full".to_string()));
        }
        self.voice.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Provider that answers from a script and records every request.
pub struct ScriptedProvider {
    name: &'static str,
    reply: Option<&'static str>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedProvider {
    pub fn ok(name: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Some(reply),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Network("connection refused".to_string()))
    }
}

/// Speech-to-text stub returning a fixed transcript or failing.
pub struct FixedTranscriber(pub Option<&'static str>);

#[async_trait]
impl SpeechToText for FixedTranscriber {
    async fn transcribe(&self, _audio: Vec<u8>, _filename: &str) -> Result<String, ProviderError> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| ProviderError::NotConfigured("STT_API_KEY".to_string()))
    }
}
