//! Page handlers: entry page, submissions, dashboard and the chat form

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form,
};
use lexlens_core::chat;
use lexlens_core::intake::request_url_analysis;
use lexlens_core::layout::{self, dashboard_location};
use lexlens_core::pipeline::{LOADING_DETAIL, LOADING_HEADING};
use lexlens_core::{
    client::DOCUMENT_FIELD, DashboardView, DocumentUpload, IntakeError, SessionId, UploadPolicy,
};
use serde::Deserialize;
use tracing::{debug, info};
use v_htmlescape::escape;

use crate::error::ServerError;
use crate::state::AppState;

const STYLESHEET: &str = include_str!("../static/styles.css");

const FALLBACK_MIME: &str = "application/octet-stream";

/// Entry page, with an alert when a submission was turned back
pub fn render_index(alert: Option<&str>) -> String {
    let alert = alert.map(layout::alert).unwrap_or_default();
    let body = format!(
        r#"<header class="hero">
    <h1>LexLens</h1>
    <p>Upload a rental agreement or contract and get a plain-English summary, risk flags and key clauses.</p>
</header>
<main class="intake">
    {alert}
    <section class="intake-card">
        <h2><i data-lucide="upload"></i> Upload a document</h2>
        <form id="uploadForm" method="post" action="/upload" enctype="multipart/form-data" onsubmit="showLoading()">
            <input id="fileInput" type="file" name="{field}" accept=".pdf,.doc,.docx,.txt" required>
            <button type="submit">Analyze</button>
        </form>
    </section>
    <section class="intake-card">
        <h2><i data-lucide="clipboard"></i> Paste text</h2>
        <form id="pasteForm" method="post" action="/paste" onsubmit="showLoading()">
            <textarea id="textInput" name="text" rows="8" placeholder="Paste your document text here..."></textarea>
            <button type="submit">Analyze Text</button>
        </form>
    </section>
    <section class="intake-card">
        <h2><i data-lucide="link"></i> Analyze from a URL</h2>
        <form id="urlForm" method="post" action="/url">
            <input id="urlInput" type="text" name="url" placeholder="https://example.com/lease.pdf">
            <button type="submit">Fetch</button>
        </form>
    </section>
</main>
<div id="loadingOverlay" class="loading-overlay" hidden>
    <div class="spinner"></div>
    <h3>{heading}</h3>
    <p>{detail}</p>
</div>
<script>function showLoading() {{ document.getElementById('loadingOverlay').hidden = false; }}</script>"#,
        alert = alert,
        field = DOCUMENT_FIELD,
        heading = escape(LOADING_HEADING),
        detail = escape(LOADING_DETAIL),
    );
    layout::page("Analyze a document", &body)
}

/// Handler: GET / and GET /index.html
pub async fn handle_index() -> Html<String> {
    Html(render_index(None))
}

/// Handler: GET /static/styles.css
pub async fn handle_stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// Multipart failures caused by the body limit read as an oversized file
fn multipart_error(err: MultipartError, policy: &UploadPolicy) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        debug!("Upload stopped at the body limit: {}", err.body_text());
        return IntakeError::TooLarge {
            size: policy.max_bytes.saturating_add(1),
            limit: policy.max_bytes,
        }
        .into();
    }
    ServerError::InvalidRequest(err.body_text())
}

/// Handler: POST /upload
///
/// The file is read chunk by chunk and dropped as soon as it passes the
/// policy's size limit.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, ServerError> {
    let policy = state.pipeline.policy();
    let mut upload = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, policy))?
    {
        if field.name() != Some(DOCUMENT_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let mime_type = field.content_type().unwrap_or(FALLBACK_MIME).to_string();
        if file_name.trim().is_empty() {
            return Err(IntakeError::EmptyFileName.into());
        }
        policy.check_type(&mime_type)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, policy))? {
            bytes.extend_from_slice(&chunk);
            if let Some(limit) = policy.size_limit() {
                let size = bytes.len() as u64;
                if size > limit {
                    debug!("Rejected upload {} past {} bytes", file_name, limit);
                    return Err(IntakeError::TooLarge { size, limit }.into());
                }
            }
        }

        debug!("Received {} ({}, {} bytes)", file_name, mime_type, bytes.len());
        upload = Some(DocumentUpload::new(file_name, &mime_type, bytes));
        break;
    }

    let upload = upload.ok_or(IntakeError::EmptyFileName)?;
    let submission = state.pipeline.submit_file(upload).await?;
    Ok(Redirect::to(&submission.location))
}

#[derive(Deserialize)]
pub struct PasteForm {
    #[serde(default)]
    pub text: String,
}

/// Handler: POST /paste
pub async fn handle_paste(
    State(state): State<AppState>,
    Form(form): Form<PasteForm>,
) -> Result<Redirect, ServerError> {
    let submission = state.pipeline.submit_paste(&form.text).await?;
    Ok(Redirect::to(&submission.location))
}

#[derive(Deserialize)]
pub struct UrlForm {
    #[serde(default)]
    pub url: String,
}

/// Handler: POST /url
///
/// Always answers with the entry page and an alert.
pub async fn handle_url(Form(form): Form<UrlForm>) -> ServerError {
    request_url_analysis(&form.url).into()
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub session: Option<String>,
}

/// Handler: GET /dashboard.html
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, ServerError> {
    let session = state
        .sessions
        .lookup(query.session.as_deref())
        .map_err(|err| {
            debug!("Dashboard without analysis data: {}", err);
            ServerError::MissingState
        })?;

    Ok(Html(DashboardView::from_session(&session).render()))
}

#[derive(Deserialize)]
pub struct ChatForm {
    pub session: String,
    #[serde(default)]
    pub question: String,
    /// Set when one of the suggested-question buttons was pressed
    pub suggestion: Option<String>,
}

/// Handler: POST /chat
///
/// Answers inline, then sends the browser back to the chat section.
pub async fn handle_chat_form(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> Result<Redirect, ServerError> {
    let id: SessionId = form.session.parse().map_err(|_| ServerError::MissingState)?;

    let question = form.suggestion.as_deref().unwrap_or(&form.question);

    let answer = chat::ask(&state.sessions, state.responder.as_ref(), &id, question)
        .await
        .map_err(|err| {
            debug!("Chat for unknown session: {}", err);
            ServerError::MissingState
        })?;

    if answer.is_some() {
        info!("Answered question for session {}", id);
    }

    Ok(Redirect::to(&format!(
        "{}#chat",
        dashboard_location(&id.to_string())
    )))
}
