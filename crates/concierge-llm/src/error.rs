//! Error types for provider calls.

use concierge_core::error::ConciergeError;

/// Failure of a single provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    NotConfigured(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("no LLM provider configured")]
    NoProviders,
}

impl ProviderError {
    /// Classify a transport error from reqwest.
    ///
    /// The request URL is dropped from the message: Gemini carries its API
    /// key in the query string.
    pub fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::Network(err.without_url().to_string())
        }
    }

    /// A response body that could not be decoded.
    pub fn undecodable(err: reqwest::Error) -> Self {
        ProviderError::InvalidResponse(err.without_url().to_string())
    }
}

impl From<ProviderError> for ConciergeError {
    fn from(err: ProviderError) -> Self {
        ConciergeError::Provider(err.to_string())
    }
}
