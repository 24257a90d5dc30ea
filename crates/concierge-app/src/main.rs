//! Concierge application binary - composition root.
//!
//! 1. Resolve configuration (file, then env, then CLI flags)
//! 2. Open the optional SQLite store
//! 3. Resolve the LLM provider registry and speech-to-text client once
//! 4. Serve the axum API, or seed the FAQ table and exit

mod cli;

use std::sync::Arc;

use clap::Parser;

use concierge_api::state::AppState;
use concierge_core::config::ConciergeConfig;
use concierge_core::error::ConciergeError;
use concierge_llm::{ProviderRegistry, WhisperClient};
use concierge_storage::{default_faqs, seed_faqs, StoreHandle};

use crate::cli::CliArgs;

fn load_config(args: &CliArgs) -> Result<ConciergeConfig, ConciergeError> {
    let (path, explicit) = args.resolve_config_path();
    let mut config = if explicit || path.exists() {
        ConciergeConfig::load(&path)?
    } else {
        ConciergeConfig::default()
    };
    config.apply_env();
    args.apply_overrides(&mut config);
    Ok(config)
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();
}

fn run_seed(config: &ConciergeConfig) -> Result<(), ConciergeError> {
    let store = StoreHandle::open(config.storage.database_url.as_deref());
    if !store.is_available() {
        return Err(ConciergeError::Config(
            "DATABASE_URL is required to seed FAQs".to_string(),
        ));
    }
    let count = seed_faqs(&store, &default_faqs())?;
    tracing::info!(count, "Seeded FAQs");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal.
    let dotenv = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_tracing(&config.general.log_level);

    tracing::info!("Starting concierge v{}", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    if args.seed_faqs {
        run_seed(&config)?;
        return Ok(());
    }

    // Storage.
    let store = StoreHandle::open(config.storage.database_url.as_deref());
    tracing::info!(persistence = store.is_available(), "Storage initialized");

    // Providers, resolved once.
    let providers = ProviderRegistry::from_config(&config.llm);
    if !providers.has_active() {
        tracing::warn!("No LLM provider configured; text replies will use the fallback message");
    }

    let stt = WhisperClient::from_config(&config.speech, config.speech_api_key())?;
    if !stt.is_configured() {
        tracing::warn!("No speech-to-text key configured; voice requests will fail");
    }

    let state = AppState::new(config.clone(), store, providers, Arc::new(stt));

    if let Err(e) = concierge_api::start_server(&config, state).await {
        tracing::error!(error = %e, "API server failed");
        return Err(e.into());
    }

    Ok(())
}
