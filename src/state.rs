//! Application state: the drill session, prompts, and the Gemini client.
//!
//! This module owns:
//!   - the single in-memory quiz session behind an RwLock
//!   - the prompts struct (from TOML or defaults)
//!   - the Gemini client
//!
//! Everything lives for the life of the process; nothing is persisted.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::config::{load_trainer_config_from_env, Prompts};
use crate::gemini::Gemini;
use crate::quiz::QuizSession;

#[derive(Clone)]
pub struct AppState {
    pub quiz: Arc<RwLock<QuizSession>>,
    pub gemini: Gemini,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, init the Gemini client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Result<Self, reqwest::Error> {
        // Load TOML config if provided (prompt overrides).
        let prompts = load_trainer_config_from_env().unwrap_or_default().prompts;

        let gemini = Gemini::from_env()?;
        if gemini.key_is_placeholder() {
            warn!(target: "zhongkuai_backend", model = %gemini.model, "GEMINI_API_KEY not set. Generation will fail until one is provided.");
        } else {
            info!(target: "zhongkuai_backend", base_url = %gemini.base_url, model = %gemini.model, "Gemini enabled.");
        }

        Ok(Self {
            quiz: Arc::new(RwLock::new(QuizSession::new())),
            gemini,
            prompts,
        })
    }
}
