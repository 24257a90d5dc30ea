//! Concierge storage crate - SQLite persistence for conversation turns,
//! FAQ reference data, and voice transcripts.
//!
//! The database is optional: when no connection string is configured, or
//! the database cannot be opened, every store reports itself unavailable
//! and callers degrade to empty history.

pub mod db;
pub mod history;
pub mod migrations;
pub mod repository;
pub mod seed;

pub use db::{Database, StoreHandle};
pub use history::{HistoryStore, SqliteStore, VoiceStore};
pub use repository::{FaqRepository, InteractionRepository, VoiceRecordRepository};
pub use seed::{default_faqs, seed_faqs};
