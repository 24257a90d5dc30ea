//! Speech-to-text for the voice endpoint.
//!
//! [`WhisperClient`] talks to any Whisper-compatible
//! `/audio/transcriptions` endpoint (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use concierge_core::config::SpeechConfig;

use crate::error::ProviderError;
use crate::groq::non_empty_or;

const DEFAULT_MODEL: &str = "whisper-large-v3";
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Turns an uploaded audio clip into text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
}

pub struct WhisperClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout_secs: u64,
}

impl WhisperClient {
    /// Build a client. A missing key is accepted here and reported on
    /// every transcription attempt instead.
    pub fn from_config(config: &SpeechConfig, api_key: Option<&str>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            model: non_empty_or(&config.model, DEFAULT_MODEL),
            base_url: non_empty_or(&config.base_url, DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("STT_API_KEY".to_string()))?;

        let filename = if filename.trim().is_empty() {
            "audio.wav"
        } else {
            filename
        };
        let part = Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str(mime_for(filename))
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        let url = format!("{}/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
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

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(ProviderError::undecodable)?;

        parsed
            .text
            .map(|t| t.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("transcription had no text".to_string()))
    }
}

/// Guess an audio MIME type from the upload's file extension.
fn mime_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}
