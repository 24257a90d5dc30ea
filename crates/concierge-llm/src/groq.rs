//! Chat-completion provider for Groq's OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use concierge_core::config::ProviderConfig;

use crate::error::ProviderError;
use crate::provider::{GenerateRequest, LlmProvider, Sampling};

const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

// --- Wire types ---

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<CompletionMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct CompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    content: Option<String>,
}

// --- Provider ---

pub struct GroqProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
    sampling: Sampling,
}

impl GroqProvider {
    /// Build a client from config.
    ///
    /// Fails with `NotConfigured` when no API key is present.
    pub fn from_config(
        config: &ProviderConfig,
        timeout: Duration,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("GROQ_API_KEY".to_string()))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model: non_empty_or(&config.model, DEFAULT_MODEL),
            base_url: non_empty_or(&config.base_url, DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: timeout.as_secs(),
            sampling: Sampling {
                temperature,
                max_tokens,
            },
        })
    }

    fn build_messages(request: &GenerateRequest) -> Vec<CompletionMessage<'_>> {
        let mut messages = Vec::with_capacity(2);
        if !request.system_prompt.is_empty() {
            messages.push(CompletionMessage {
                role: "system",
                content: &request.system_prompt,
            });
        }
        messages.push(CompletionMessage {
            role: "user",
            content: &request.user_prompt,
        });
        messages
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ProviderError> {
        let (temperature, max_tokens) = self.sampling.resolve(request);
        let body = CompletionRequest {
            model: request.model.as_deref().unwrap_or(&self.model),
            messages: Self::build_messages(request),
            temperature,
            max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(ProviderError::undecodable)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("Groq API returned no choices".to_string()))
    }
}

pub(crate) fn non_empty_or(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: key.map(str::to_string),
            model: String::new(),
            base_url: String::new(),
        }
    }

    #[test]
    fn test_missing_key_is_not_configured() {
        let result = GroqProvider::from_config(&config(None), Duration::from_secs(5), 0.2, 512);
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));

        let result =
            GroqProvider::from_config(&config(Some("  ")), Duration::from_secs(5), 0.2, 512);
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn test_defaults_fill_blank_model_and_url() {
        let provider =
            GroqProvider::from_config(&config(Some("gsk")), Duration::from_secs(5), 0.2, 512)
                .unwrap();
        assert_eq!(provider.model, DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.name(), "groq");
    }

    #[test]
    fn test_system_prompt_omitted_when_empty() {
        let req = GenerateRequest::new("", "hi");
        let messages = GroqProvider::build_messages(&req);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");

        let req = GenerateRequest::new("be brief", "hi");
        let messages = GroqProvider::build_messages(&req);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
    }
}
