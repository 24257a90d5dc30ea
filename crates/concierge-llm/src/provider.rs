//! The provider contract shared by every LLM client.

use async_trait::async_trait;

use crate::error::ProviderError;

/// A single generation call.
///
/// Unset sampling fields fall back to the provider's configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A reply-generating LLM backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier used in logs and the provider order list.
    fn name(&self) -> &str;

    /// Produce reply text, or fail with the upstream status/body.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ProviderError>;
}

/// Sampling defaults shared by the concrete providers.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Sampling {
    pub fn resolve(&self, request: &GenerateRequest) -> (f32, u32) {
        (
            request.temperature.unwrap_or(self.temperature),
            request.max_tokens.unwrap_or(self.max_tokens),
        )
    }
}
