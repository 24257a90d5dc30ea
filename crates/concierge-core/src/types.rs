use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConciergeError;

// =============================================================================
// Enums
// =============================================================================

/// Speaker of a persisted conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The guest talking to the assistant.
    User,
    /// A reply produced by the assistant (FAQ, LLM, or fallback).
    Assistant,
    /// Operator-injected context.
    System,
}

impl Role {
    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }

    /// Speaker label used when rendering a transcript into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConciergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(ConciergeError::Validation(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// Core data model
// =============================================================================

/// One persisted turn of a conversation.
///
/// Interactions are append-only: the service creates them and reads them
/// back, but never updates or deletes them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    /// Grouping key shared by every turn of one conversation. Never empty.
    pub conversation_id: String,
    pub role: Role,
    /// Utterance text. Never empty.
    pub text: String,
    /// Open-ended metadata (reply source, provider name, ...).
    #[serde(default = "empty_meta")]
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

fn empty_meta() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Interaction {
    /// Build a new interaction stamped with the current time.
    ///
    /// Fails if the conversation id or text is blank.
    pub fn new(
        conversation_id: impl Into<String>,
        role: Role,
        text: impl Into<String>,
    ) -> Result<Self, ConciergeError> {
        let conversation_id = conversation_id.into();
        let text = text.into();
        if conversation_id.trim().is_empty() {
            return Err(ConciergeError::Validation(
                "interaction requires a conversation id".to_string(),
            ));
        }
        if text.trim().is_empty() {
            return Err(ConciergeError::Validation(
                "interaction text must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            conversation_id,
            role,
            text,
            meta: empty_meta(),
            created_at: Utc::now(),
        })
    }

    /// Attach metadata, replacing any existing value.
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = meta;
        self
    }
}

/// A seeded question/answer pair consulted by the voice path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Transcript/reply pair recorded by the voice endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRecord {
    pub id: Uuid,
    pub transcript: String,
    pub reply: String,
    pub created_at: DateTime<Utc>,
}

impl VoiceRecord {
    pub fn new(transcript: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: transcript.into(),
            reply: reply.into(),
            created_at: Utc::now(),
        }
    }
}
