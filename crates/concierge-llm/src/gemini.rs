//! Single-shot text generation provider for Gemini's `generateText` API.
//!
//! The system and user prompts are folded into one prompt string.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use concierge_core::config::ProviderConfig;

use crate::error::ProviderError;
use crate::groq::non_empty_or;
use crate::provider::{GenerateRequest, LlmProvider, Sampling};

const DEFAULT_MODEL: &str = "text-bison-001";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta2";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest {
    prompt: TextPrompt,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt {
    text: String,
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout_secs: u64,
    sampling: Sampling,
}

impl GeminiProvider {
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
            .ok_or_else(|| ProviderError::NotConfigured("GEMINI_API_KEY".to_string()))?;

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

    fn endpoint(&self, model: &str) -> String {
        let model = model.trim_matches('/');
        format!("{}/models/{}:generateText", self.base_url, model)
    }

    fn prompt_text(request: &GenerateRequest) -> String {
        if request.system_prompt.is_empty() {
            request.user_prompt.clone()
        } else {
            format!("{}\n\n{}", request.system_prompt, request.user_prompt)
        }
    }

    /// Pull reply text out of the several response shapes the API has used.
    fn extract_text(json: &Value) -> Option<String> {
        let candidate = &json["candidates"][0];
        [
            &candidate["output"],
            &candidate["content"],
            &json["output"][0]["content"],
            &json["text"],
        ]
        .into_iter()
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Object(_) | Value::Array(_) => Some(v.to_string()),
            _ => None,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ProviderError> {
        let (temperature, max_output_tokens) = self.sampling.resolve(request);
        let body = GenerateTextRequest {
            prompt: TextPrompt {
                text: Self::prompt_text(request),
            },
            temperature,
            max_output_tokens,
        };

        let url = self.endpoint(request.model.as_deref().unwrap_or(&self.model));
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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

        let json: Value = response
            .json()
            .await
            .map_err(ProviderError::undecodable)?;

        Self::extract_text(&json).ok_or_else(|| {
            ProviderError::InvalidResponse("Gemini response carried no output".to_string())
        })
    }
}
