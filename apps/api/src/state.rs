use std::sync::Arc;

use tokio::sync::Mutex;

use crate::ai::AiCapability;
use crate::config::Config;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stores and workspace. Never held across an AI call.
    pub session: Arc<Mutex<Session>>,
    pub ai: Arc<dyn AiCapability>,
    /// Plain HTTP client for fetching job posting pages.
    pub http: reqwest::Client,
    pub config: Config,
}

impl AppState {
    pub fn new(session: Session, ai: Arc<dyn AiCapability>, config: Config) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            ai,
            http: reqwest::Client::new(),
            config,
        }
    }
}
