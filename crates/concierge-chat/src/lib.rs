//! Conversation layer for the concierge service.
//!
//! The text path ([`ConversationOrchestrator`]) answers from FAQ rules or
//! the provider chain with conversation history; the voice path
//! ([`VoiceIntake`]) transcribes audio and answers with FAQ context.

pub mod context;
pub mod error;
pub mod faq;
pub mod orchestrator;
pub mod persist;
pub mod voice;

#[cfg(test)]
mod testing;

pub use context::{build_prompt, SYSTEM_PROMPT};
pub use error::ChatError;
pub use faq::match_faq;
pub use orchestrator::{
    fallback_reply, ConversationOrchestrator, ReplySource, TextReply, DEFAULT_HISTORY_LIMIT,
    EMPTY_INPUT_REPLY,
};
pub use persist::PersistOutcome;
pub use voice::{extract_keywords, VoiceIntake, VoiceReply};
