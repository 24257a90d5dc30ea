//! Conversation orchestrator: the text path.
//!
//! One call handles one guest turn:
//! resolve the conversation id, persist the user turn, try the FAQ rules,
//! otherwise build a prompt from recent history and walk the provider chain,
//! then persist the assistant turn. Store and provider failures degrade the
//! reply but never fail the call.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use concierge_core::types::Role;
use concierge_llm::{ChainOutcome, GenerateRequest, ProviderRegistry};
use concierge_storage::HistoryStore;

use crate::context::{build_prompt, truncate_chars, SYSTEM_PROMPT};
use crate::faq::match_faq;
use crate::persist::append_turn;

/// Number of past turns fed back into the prompt.
pub const DEFAULT_HISTORY_LIMIT: usize = 8;

/// Reply given when the transcript is blank.
pub const EMPTY_INPUT_REPLY: &str = "It seems like you didn't type or say a question. Please ask a quick question (e.g., 'What time is check-in?').";

/// Characters of the guest's text echoed back in the fallback reply.
const FALLBACK_ECHO_CHARS: usize = 200;

/// Characters of the assembled prompt written to the debug log.
const PROMPT_LOG_CHARS: usize = 1000;

/// Response body of the text endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReply {
    pub transcript: String,
    pub reply: String,
    pub conversation_id: String,
}

/// Where an assistant reply came from. Stored in the turn's `meta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Faq,
    Llm { provider: String },
    Fallback,
}

impl ReplySource {
    pub fn meta(&self) -> Value {
        match self {
            ReplySource::Faq => json!({ "source": "faq" }),
            ReplySource::Llm { provider } => json!({ "source": "llm", "provider": provider }),
            ReplySource::Fallback => json!({ "source": "fallback" }),
        }
    }
}

/// Canned apology used when every provider failed.
pub fn fallback_reply(transcript: &str) -> String {
    format!(
        "I heard: \"{}\". I'm having trouble contacting the language service right now — please try again in a moment.",
        truncate_chars(transcript, FALLBACK_ECHO_CHARS)
    )
}

/// The supplied id when it is non-blank (trimmed), otherwise a fresh UUID.
pub fn resolve_conversation_id(incoming: Option<&str>) -> String {
    match incoming.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Ties the FAQ rules, history store, and provider chain together.
pub struct ConversationOrchestrator {
    store: Arc<dyn HistoryStore>,
    providers: Arc<ProviderRegistry>,
    history_limit: usize,
}

impl ConversationOrchestrator {
    pub fn new(store: Arc<dyn HistoryStore>, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            store,
            providers,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Produce a reply for one guest turn.
    ///
    /// Always returns a reply: a blank transcript gets a prompt for input,
    /// and a failed provider chain gets the canned apology.
    pub async fn handle(&self, transcript: &str, conversation_id: Option<&str>) -> TextReply {
        let conversation_id = resolve_conversation_id(conversation_id);

        if transcript.trim().is_empty() {
            debug!(conversation_id = %conversation_id, "Empty transcript; prompting for input");
            return TextReply {
                transcript: String::new(),
                reply: EMPTY_INPUT_REPLY.to_string(),
                conversation_id,
            };
        }

        append_turn(
            self.store.as_ref(),
            &conversation_id,
            Role::User,
            transcript,
            None,
        )
        .await
        .log("user turn");

        let (reply, source) = match match_faq(transcript) {
            Some(answer) => {
                info!(conversation_id = %conversation_id, "Answered from FAQ rules");
                (answer.to_string(), ReplySource::Faq)
            }
            None => self.generate_reply(&conversation_id, transcript).await,
        };

        append_turn(
            self.store.as_ref(),
            &conversation_id,
            Role::Assistant,
            &reply,
            Some(source.meta()),
        )
        .await
        .log("assistant turn");

        TextReply {
            transcript: transcript.to_string(),
            reply,
            conversation_id,
        }
    }

    async fn generate_reply(&self, conversation_id: &str, transcript: &str) -> (String, ReplySource) {
        let recent = self.store.recent(conversation_id, self.history_limit).await;
        let prompt = build_prompt(SYSTEM_PROMPT, &recent, transcript);
        debug!(
            conversation_id,
            history = recent.len(),
            prompt = truncate_chars(&prompt, PROMPT_LOG_CHARS),
            "Assembled LLM prompt"
        );

        let request = GenerateRequest::new(SYSTEM_PROMPT, prompt);
        match self.providers.generate(&request).await {
            ChainOutcome::Succeeded {
                provider,
                reply,
                failures,
            } => {
                if !failures.is_empty() {
                    info!(
                        conversation_id,
                        provider = %provider,
                        failed = failures.len(),
                        "Reply from fallback provider"
                    );
                }
                (reply, ReplySource::Llm { provider })
            }
            ChainOutcome::Exhausted { failures } => {
                for failure in &failures {
                    warn!(
                        conversation_id,
                        provider = %failure.provider,
                        error = %failure.error,
                        "Provider exhausted"
                    );
                }
                (fallback_reply(transcript), ReplySource::Fallback)
            }
        }
    }
}
