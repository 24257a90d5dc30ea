//! Voice intake: transcribe, look up FAQ context, ask the first provider.
//!
//! Unlike the text path there is no canned fallback here, so transcription
//! and LLM failures end the request.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use concierge_core::types::{FaqEntry, VoiceRecord};
use concierge_llm::{GenerateRequest, ProviderRegistry, SpeechToText};
use concierge_storage::VoiceStore;

use crate::error::ChatError;
use crate::persist::{record_voice, PersistOutcome};

pub const VOICE_SYSTEM_PROMPT: &str =
    "You are a concise and helpful hotel assistant. Use provided FAQ context when relevant.";

const MAX_KEYWORDS: usize = 6;
const MAX_FAQ_MATCHES: usize = 4;
const VOICE_TEMPERATURE: f32 = 0.2;
const VOICE_MAX_TOKENS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceReply {
    pub transcript: String,
    pub reply: String,
}

/// Up to `max` lower-cased word tokens longer than two characters.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() > 2)
        .take(max)
        .map(str::to_string)
        .collect()
}

fn render_faq_context(faqs: &[FaqEntry]) -> String {
    faqs.iter()
        .map(|f| format!("Q: {}\nA: {}", f.question, f.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn voice_prompt(context: &str, transcript: &str) -> String {
    let context = if context.is_empty() { "None" } else { context };
    format!(
        "Context: {}\n\nUser said: {}\n\nRespond in 2-4 sentences. If the user asked for missing info, ask a clarifying question.",
        context, transcript
    )
}

pub struct VoiceIntake {
    stt: Arc<dyn SpeechToText>,
    store: Arc<dyn VoiceStore>,
    providers: Arc<ProviderRegistry>,
}

impl VoiceIntake {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        store: Arc<dyn VoiceStore>,
        providers: Arc<ProviderRegistry>,
    ) -> Self {
        Self {
            stt,
            store,
            providers,
        }
    }

    pub async fn handle(&self, audio: Vec<u8>, filename: &str) -> Result<VoiceReply, ChatError> {
        let transcript = self
            .stt
            .transcribe(audio, filename)
            .await
            .map_err(ChatError::transcription)?;
        debug!(chars = transcript.len(), "Transcribed voice upload");

        let context = self.faq_context(&transcript).await;
        let request = GenerateRequest::new(VOICE_SYSTEM_PROMPT, voice_prompt(&context, &transcript))
            .with_temperature(VOICE_TEMPERATURE)
            .with_max_tokens(VOICE_MAX_TOKENS);

        let (provider, reply) = self
            .providers
            .generate_once(&request)
            .await
            .map_err(ChatError::llm)?;
        info!(provider = %provider, "Voice reply generated");

        record_voice(self.store.as_ref(), &VoiceRecord::new(&transcript, &reply))
            .await
            .log("voice record");

        Ok(VoiceReply { transcript, reply })
    }

    /// Matched FAQ pairs rendered as prompt context; empty on any failure.
    async fn faq_context(&self, transcript: &str) -> String {
        let keywords = extract_keywords(transcript, MAX_KEYWORDS);
        if keywords.is_empty() {
            return String::new();
        }
        if !self.store.is_available() {
            PersistOutcome::Skipped("store unavailable".to_string()).log("faq lookup");
            return String::new();
        }
        match self.store.find_faqs(&keywords, MAX_FAQ_MATCHES).await {
            Ok(faqs) => {
                debug!(keywords = ?keywords, matched = faqs.len(), "FAQ lookup");
                render_faq_context(&faqs)
            }
            Err(e) => {
                PersistOutcome::Failed(e).log("faq lookup");
                String::new()
            }
        }
    }
}
