//! API handlers for the LexLens server
//!
//! Provides JSON endpoints for:
//! - Health checks
//! - Asking questions in a session's chat
//! - Exporting and importing the flat bridge entries

use axum::{
    extract::{Path, State},
    Json,
};
use lexlens_core::chat;
use lexlens_core::layout::dashboard_location;
use lexlens_core::{BridgeEntries, SessionId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub sessions: usize,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "lexlens-server",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.sessions.len(),
    })
}

/// Chat request body
#[derive(Deserialize)]
pub struct ChatApiRequest {
    pub session: String,
    pub question: String,
}

/// Chat response. `answer` is null when the question was blank or the
/// backend failed; the failure itself is only logged.
#[derive(Serialize)]
pub struct ChatApiResponse {
    pub success: bool,
    pub answer: Option<String>,
}

/// Handler: POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, ServerError> {
    let id: SessionId = req.session.parse()?;
    debug!("Chat question for session {}: {}", id, req.question);

    let answer = chat::ask(&state.sessions, state.responder.as_ref(), &id, &req.question).await?;

    Ok(Json(ChatApiResponse {
        success: true,
        answer,
    }))
}

/// Handler: GET /api/session/:id/bridge
pub async fn handle_export_bridge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BridgeEntries>, ServerError> {
    let id: SessionId = id.parse()?;
    Ok(Json(state.sessions.export_entries(&id)?))
}

/// Bridge import response
#[derive(Serialize)]
pub struct ImportBridgeResponse {
    pub success: bool,
    pub session: String,
    pub location: String,
}

/// Handler: POST /api/bridge
pub async fn handle_import_bridge(
    State(state): State<AppState>,
    Json(entries): Json<BridgeEntries>,
) -> Result<Json<ImportBridgeResponse>, ServerError> {
    let id = state.sessions.import_entries(&entries)?;
    info!("Imported bridge entries as session {}", id);

    let session = id.to_string();
    Ok(Json(ImportBridgeResponse {
        success: true,
        location: dashboard_location(&session),
        session,
    }))
}
