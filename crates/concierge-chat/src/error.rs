//! Error types for the conversation layer.

use concierge_llm::ProviderError;

/// Errors that end a request on a path with no fallback reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("LLM error: {0}")]
    Llm(String),
}

impl ChatError {
    pub fn transcription(err: ProviderError) -> Self {
        ChatError::Transcription(err.to_string())
    }

    pub fn llm(err: ProviderError) -> Self {
        ChatError::Llm(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::transcription(ProviderError::NotConfigured("STT_API_KEY".to_string()));
        assert_eq!(
            err.to_string(),
            "transcription failed: STT_API_KEY is not configured"
        );

        let err = ChatError::llm(ProviderError::Timeout(120));
        assert_eq!(err.to_string(), "LLM error: request timed out after 120s");
    }
}
