//! Shared application state.

use koko_config::KokoConfig;
use koko_core::{SessionStore, TurnRunner};
use koko_db::Database;
use koko_memory::MemoryStore;
use std::sync::Arc;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration.
    pub config: Arc<KokoConfig>,
    /// Session-keyed conversations.
    pub sessions: SessionStore,
    /// The tool-call loop runner.
    pub runner: Arc<TurnRunner>,
    /// Memory notebook store.
    pub memory: Arc<dyn MemoryStore>,
    /// Database handle for the liveness probe.
    pub database: Arc<Database>,
    /// Shared HTTP client for outbound fetches.
    pub http: reqwest::Client,
}

impl AppState {
    /// Assemble state from already-constructed parts.
    pub fn new(
        config: KokoConfig,
        sessions: SessionStore,
        runner: TurnRunner,
        memory: Arc<dyn MemoryStore>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
            runner: Arc::new(runner),
            memory,
            database,
            http: reqwest::Client::new(),
        }
    }
}
