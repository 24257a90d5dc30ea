use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the concierge service.
///
/// Loaded from an optional TOML file, then overlaid with environment
/// variables. Each section corresponds to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConciergeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl ConciergeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConciergeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset, so an exported-but-empty
    /// credential never enables a provider.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get("DATABASE_URL") {
            self.storage.database_url = Some(url);
        }

        if let Some(port) = get("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => warn!(value = %port, "Ignoring unparsable PORT"),
            }
        }
        if let Some(origin) = get("FRONTEND_URL") {
            self.server.push_origin(&origin);
        }
        if let Some(origins) = get("CORS_ORIGINS") {
            for origin in origins.split(',') {
                self.server.push_origin(origin);
            }
        }

        if let Some(key) = get("GROQ_API_KEY") {
            self.llm.groq.api_key = Some(key);
        }
        if let Some(model) = get("GROQ_MODEL") {
            self.llm.groq.model = model;
        }
        if let Some(url) = get("GROQ_BASE_URL") {
            self.llm.groq.base_url = url;
        }

        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            self.llm.gemini.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.llm.gemini.model = model;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            self.llm.gemini.base_url = url;
        }

        if let Some(order) = get("LLM_PROVIDER_ORDER") {
            self.llm.provider_order = order
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(key) = get("STT_API_KEY") {
            self.speech.api_key = Some(key);
        }
        if let Some(model) = get("STT_MODEL") {
            self.speech.model = model;
        }
        if let Some(url) = get("STT_BASE_URL") {
            self.speech.base_url = url;
        }
    }

    /// Credential used for speech-to-text: the dedicated key, or the Groq key.
    pub fn speech_api_key(&self) -> Option<&str> {
        self.speech
            .api_key
            .as_deref()
            .or(self.llm.groq.api_key.as_deref())
    }
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// HTTP listener and CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listening port.
    pub port: u16,
    /// Browser origins allowed to call the API. Requests without an
    /// `Origin` header are always accepted.
    pub allowed_origins: Vec<String>,
    /// Maximum JSON body size in bytes.
    pub json_body_limit: usize,
    /// Maximum multipart audio upload in bytes.
    pub audio_body_limit: usize,
}

impl ServerConfig {
    fn push_origin(&mut self, origin: &str) {
        let origin = origin.trim().trim_end_matches('/');
        if !origin.is_empty() && !self.allowed_origins.iter().any(|o| o == origin) {
            self.allowed_origins.push(origin.to_string());
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            json_body_limit: 2 * 1024 * 1024,
            audio_body_limit: 25 * 1024 * 1024,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database path. `None` disables persistence entirely.
    pub database_url: Option<String>,
    /// Number of recent turns pulled into the LLM prompt.
    pub history_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            history_limit: 8,
        }
    }
}

/// LLM provider chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider names in the order they are tried.
    pub provider_order: Vec<String>,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature used when a request does not set one.
    pub temperature: f32,
    /// Token budget used when a request does not set one.
    pub max_tokens: u32,
    pub groq: ProviderConfig,
    pub gemini: ProviderConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_order: vec!["groq".to_string(), "gemini".to_string()],
            timeout_secs: 120,
            temperature: 0.2,
            max_tokens: 512,
            groq: ProviderConfig {
                api_key: None,
                model: "llama-3.1-8b-instant".to_string(),
                base_url: "https://api.groq.com/openai/v1".to_string(),
            },
            gemini: ProviderConfig {
                api_key: None,
                model: "text-bison-001".to_string(),
                base_url: "https://generativelanguage.googleapis.com/v1beta2".to_string(),
            },
        }
    }
}

/// Credentials and endpoint for a single provider.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// API key. `None` removes the provider from the chain.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderConfig {
    /// Whether a usable credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Speech-to-text settings for the voice endpoint.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// API key; falls back to the Groq key when unset.
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL of a Whisper-compatible `/audio/transcriptions` API.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "whisper-large-v3".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
