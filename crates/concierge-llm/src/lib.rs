//! LLM client adapters for the concierge service.
//!
//! Two interchangeable providers sit behind the [`LlmProvider`] contract:
//! an OpenAI-compatible chat-completion client (Groq) and a single-shot
//! text-generation client (Gemini). The [`ProviderRegistry`] is resolved
//! once at startup and walks the configured providers in order until one
//! answers. A Whisper-compatible speech-to-text client serves the voice path.

pub mod error;
pub mod gemini;
pub mod groq;
pub mod provider;
pub mod registry;
pub mod speech;

pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use provider::{GenerateRequest, LlmProvider};
pub use registry::{ChainOutcome, ProviderFailure, ProviderRegistry};
pub use speech::{SpeechToText, WhisperClient};
