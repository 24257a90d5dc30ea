//! Ordered provider registry and the fallback chain.
//!
//! Every configured provider name gets a slot at startup. A slot holds an
//! initialized client, or nothing when its credential is absent; the chain
//! only ever visits initialized slots.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use concierge_core::config::LlmConfig;

use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::groq::GroqProvider;
use crate::provider::{GenerateRequest, LlmProvider};

/// A named position in the provider order.
struct ProviderSlot {
    name: String,
    provider: Option<Arc<dyn LlmProvider>>,
}

/// One provider attempt that did not produce a reply.
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: ProviderError,
}

/// Terminal state of a walk down the chain.
#[derive(Debug)]
pub enum ChainOutcome {
    /// A provider answered. `failures` lists the providers tried before it.
    Succeeded {
        provider: String,
        reply: String,
        failures: Vec<ProviderFailure>,
    },
    /// Every initialized provider failed, or none was initialized.
    Exhausted { failures: Vec<ProviderFailure> },
}

impl ChainOutcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            ChainOutcome::Succeeded { reply, .. } => Some(reply),
            ChainOutcome::Exhausted { .. } => None,
        }
    }
}

/// Ordered set of LLM providers, resolved once at startup.
#[derive(Default)]
pub struct ProviderRegistry {
    slots: Vec<ProviderSlot>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Build the registry from configuration.
    ///
    /// Providers without credentials keep an empty slot; unknown names are
    /// logged and skipped.
    pub fn from_config(config: &LlmConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let mut registry = Self::new();

        for name in &config.provider_order {
            let built: Result<Arc<dyn LlmProvider>, ProviderError> = match name.as_str() {
                "groq" => GroqProvider::from_config(
                    &config.groq,
                    timeout,
                    config.temperature,
                    config.max_tokens,
                )
                .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
                "gemini" => GeminiProvider::from_config(
                    &config.gemini,
                    timeout,
                    config.temperature,
                    config.max_tokens,
                )
                .map(|p| Arc::new(p) as Arc<dyn LlmProvider>),
                other => {
                    warn!(provider = other, "Unknown LLM provider in order list; skipping");
                    continue;
                }
            };

            match built {
                Ok(provider) => {
                    info!(provider = %name, "LLM provider enabled");
                    registry.register(name.clone(), Some(provider));
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "LLM provider disabled");
                    registry.register(name.clone(), None);
                }
            }
        }

        registry
    }

    /// Append a slot to the end of the order.
    pub fn register(&mut self, name: impl Into<String>, provider: Option<Arc<dyn LlmProvider>>) {
        let name = name.into();
        if self.slots.iter().any(|s| s.name == name) {
            warn!(provider = %name, "Duplicate LLM provider in order list; keeping first");
            return;
        }
        self.slots.push(ProviderSlot { name, provider });
    }

    /// Builder form of [`register`](Self::register) for an initialized provider.
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        let name = provider.name().to_string();
        self.register(name, Some(provider));
        self
    }

    /// Initialized providers in chain order.
    pub fn active(&self) -> impl Iterator<Item = &Arc<dyn LlmProvider>> {
        self.slots.iter().filter_map(|s| s.provider.as_ref())
    }

    /// `(name, enabled)` for every slot, in order.
    pub fn status(&self) -> Vec<(String, bool)> {
        self.slots
            .iter()
            .map(|s| (s.name.clone(), s.provider.is_some()))
            .collect()
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    /// Try each initialized provider in order, stopping at the first reply.
    pub async fn generate(&self, request: &GenerateRequest) -> ChainOutcome {
        let mut failures = Vec::new();

        for provider in self.active() {
            debug!(provider = provider.name(), "Trying LLM provider");
            match provider.generate(request).await {
                Ok(reply) => {
                    return ChainOutcome::Succeeded {
                        provider: provider.name().to_string(),
                        reply,
                        failures,
                    };
                }
                Err(error) => {
                    warn!(provider = provider.name(), error = %error, "LLM call failed");
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            failures.push(ProviderFailure {
                provider: "none".to_string(),
                error: ProviderError::NoProviders,
            });
        }
        ChainOutcome::Exhausted { failures }
    }

    /// Call only the first initialized provider, once.
    pub async fn generate_once(
        &self,
        request: &GenerateRequest,
    ) -> Result<(String, String), ProviderError> {
        let provider = self.active().next().ok_or(ProviderError::NoProviders)?;
        let reply = provider.generate(request).await?;
        Ok((provider.name().to_string(), reply))
    }
}
