//! CLI argument definitions for the concierge binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use clap::Parser;

use concierge_core::config::ConciergeConfig;

/// Default config file, looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "concierge.toml";

/// Hotel concierge backend: answers guest questions by text or voice.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// API server port.
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,

    /// SQLite database path (overrides DATABASE_URL).
    #[arg(short = 'd', long = "database")]
    pub database: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Replace the FAQ table with the default entries and exit.
    #[arg(long = "seed-faqs")]
    pub seed_faqs: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CONCIERGE_CONFIG env var > ./concierge.toml.
    /// The flag is `true` when the path was asked for explicitly, in which
    /// case a missing or broken file is an error.
    pub fn resolve_config_path(&self) -> (PathBuf, bool) {
        if let Some(ref p) = self.config {
            return (p.clone(), true);
        }
        if let Ok(p) = std::env::var("CONCIERGE_CONFIG") {
            if !p.trim().is_empty() {
                return (PathBuf::from(p), true);
            }
        }
        (PathBuf::from(DEFAULT_CONFIG_FILE), false)
    }

    /// Apply command-line overrides on top of file and env values.
    pub fn apply_overrides(&self, config: &mut ConciergeConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref db) = self.database {
            config.storage.database_url = Some(db.clone());
        }
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
    }
}
