//! Application state shared by all handlers

use std::sync::Arc;
use std::time::Duration;

use lexlens_core::{
    AnalysisClient, ClientError, KeywordResponder, Responder, SessionStore, SubmissionPipeline,
};
use tracing::info;

use crate::config::{ChatMode, Config};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
    pub sessions: Arc<SessionStore>,
    pub responder: Arc<dyn Responder>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = Arc::new(AnalysisClient::new(
            config.backend.url(),
            config.backend.timeout(),
        )?);
        let sessions = Arc::new(SessionStore::new(config.session.ttl()));

        let responder: Arc<dyn Responder> = match config.chat.mode {
            ChatMode::Remote => client.clone() as Arc<dyn Responder>,
            ChatMode::Offline => Arc::new(
                KeywordResponder::lease_demo()
                    .with_delay(Duration::from_millis(config.chat.reply_delay_ms)),
            ),
        };

        info!(
            "Analysis backend: {}, chat mode: {:?}, upload policy: {:?}",
            client.base_url(),
            config.chat.mode,
            config.upload.mode
        );

        let pipeline = Arc::new(SubmissionPipeline::new(
            config.upload.clone(),
            client,
            sessions.clone(),
        ));

        Ok(Self {
            pipeline,
            sessions,
            responder,
        })
    }
}
