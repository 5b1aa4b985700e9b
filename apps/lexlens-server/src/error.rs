//! Error types for the LexLens server
//!
//! Page routes answer with HTML: the entry page with an alert for
//! validation and transport failures, the missing-state page otherwise.
//! `/api/*` routes answer with a JSON error body.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use lexlens_core::pipeline::TRANSPORT_ALERT;
use lexlens_core::{render_missing_state, BridgeError, ClientError, IntakeError, SubmitError};
use serde::Serialize;
use thiserror::Error;

use crate::pages::render_index;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] IntakeError),

    #[error("Analysis request failed: {0}")]
    Transport(#[from] ClientError),

    #[error("No analysis data found")]
    MissingState,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<SubmitError> for ServerError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(err) => ServerError::Validation(err),
            SubmitError::Transport(err) => ServerError::Transport(err),
        }
    }
}

impl From<BridgeError> for ServerError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Missing => ServerError::SessionNotFound("no session given".into()),
            BridgeError::InvalidId(id) => ServerError::SessionNotFound(id),
            BridgeError::Expired(id) => ServerError::SessionNotFound(id.to_string()),
            BridgeError::MissingKey(_) | BridgeError::Malformed(_) => {
                ServerError::InvalidRequest(err.to_string())
            }
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::Validation(err) => {
                let page = render_index(Some(&err.to_string()));
                return (StatusCode::BAD_REQUEST, Html(page)).into_response();
            }
            ServerError::Transport(_) => {
                let page = render_index(Some(TRANSPORT_ALERT));
                return (StatusCode::BAD_GATEWAY, Html(page)).into_response();
            }
            ServerError::MissingState => {
                return (StatusCode::NOT_FOUND, Html(render_missing_state())).into_response();
            }
            ServerError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session '{}' not found", id),
            ),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
