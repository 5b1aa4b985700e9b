//! HTTP client for the external analysis backend
//!
//! Two endpoints, both relative to a configurable base URL:
//! - `POST analyzeDocument` with the file in multipart field `document`
//! - `POST askQuestion` with `{question, context}` JSON

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use shared_types::{AnalysisResult, AskQuestionRequest, AskQuestionResponse, DecodeError};
use thiserror::Error;
use tracing::{debug, info};

use crate::intake::DocumentUpload;

/// Default backend location
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

pub const ANALYZE_PATH: &str = "analyzeDocument";
pub const ASK_PATH: &str = "askQuestion";

/// Multipart field carrying the document
pub const DOCUMENT_FIELD: &str = "document";

/// Transport-level failures talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid backend URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend responded with status {0}")]
    Status(u16),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Something that can analyse an uploaded document
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, upload: &DocumentUpload) -> Result<AnalysisResult, ClientError>;
}

/// Something that can answer a question about a document
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, question: &str, context: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // Url::join replaces the last path segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))
    }

    /// Submit a document for analysis
    pub async fn analyze_document(
        &self,
        upload: &DocumentUpload,
    ) -> Result<AnalysisResult, ClientError> {
        let url = self.endpoint(ANALYZE_PATH)?;
        info!("Submitting {} ({} bytes) to {}", upload.file_name, upload.size(), url);

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)?;
        let form = Form::new().part(DOCUMENT_FIELD, part);

        let response = self.http.post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        debug!("Analysis response: {} bytes", body.len());

        Ok(AnalysisResult::from_json(&body)?)
    }

    /// Ask a question with the document text as context
    pub async fn ask_question(&self, question: &str, context: &str) -> Result<String, ClientError> {
        let url = self.endpoint(ASK_PATH)?;
        let body = AskQuestionRequest {
            question: question.to_string(),
            context: context.to_string(),
        };

        let response = self.http.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        let reply: AskQuestionResponse = response.json().await?;
        Ok(reply.answer)
    }
}

#[async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(&self, upload: &DocumentUpload) -> Result<AnalysisResult, ClientError> {
        self.analyze_document(upload).await
    }
}

#[async_trait]
impl Responder for AnalysisClient {
    async fn respond(&self, question: &str, context: &str) -> Result<String, ClientError> {
        self.ask_question(question, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use shared_types::RiskLevel;

    async fn analyze_stub(mut multipart: Multipart) -> Result<Json<serde_json::Value>, StatusCode> {
        while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
            if field.name() == Some(DOCUMENT_FIELD) {
                let name = field.file_name().unwrap_or_default().to_string();
                return Ok(Json(serde_json::json!({
                    "summary": format!("Summary of {}", name),
                    "riskFlags": [{"level": "Red", "title": "t", "explanation": "e"}],
                    "keyClauses": []
                })));
            }
        }
        Err(StatusCode::BAD_REQUEST)
    }

    async fn ask_stub(Json(req): Json<AskQuestionRequest>) -> Json<AskQuestionResponse> {
        Json(AskQuestionResponse {
            answer: format!("{} / {}", req.question, req.context),
        })
    }

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = AnalysisClient::new("http://backend/api", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint(ANALYZE_PATH).unwrap().as_str(),
            "http://backend/api/analyzeDocument"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = AnalysisClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn test_analyze_posts_multipart_document() {
        let base = spawn_backend(Router::new().route("/analyzeDocument", post(analyze_stub))).await;
        let client = AnalysisClient::new(&base, Duration::from_secs(5)).unwrap();

        let upload = DocumentUpload::new("Lease.pdf", "application/pdf", b"%PDF-1.7".to_vec());
        let result = client.analyze(&upload).await.unwrap();

        assert_eq!(result.summary, "Summary of Lease.pdf");
        assert_eq!(result.risk_flags[0].level, RiskLevel::Red);
    }

    #[tokio::test]
    async fn test_non_ok_status_is_an_error() {
        let router = Router::new().route(
            "/analyzeDocument",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = spawn_backend(router).await;
        let client = AnalysisClient::new(&base, Duration::from_secs(5)).unwrap();

        let upload = DocumentUpload::new("a.txt", "text/plain", b"x".to_vec());
        let err = client.analyze(&upload).await.unwrap_err();
        assert!(matches!(err, ClientError::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_decode_error() {
        let router = Router::new().route("/analyzeDocument", post(|| async { "{\"oops\": true}" }));
        let base = spawn_backend(router).await;
        let client = AnalysisClient::new(&base, Duration::from_secs(5)).unwrap();

        let upload = DocumentUpload::new("a.txt", "text/plain", b"x".to_vec());
        let err = client.analyze(&upload).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_ask_sends_question_and_context() {
        let base = spawn_backend(Router::new().route("/askQuestion", post(ask_stub))).await;
        let client = AnalysisClient::new(&base, Duration::from_secs(5)).unwrap();

        let answer = client.respond("Is rent due?", "lease text").await.unwrap();
        assert_eq!(answer, "Is rent due? / lease text");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AnalysisClient::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let upload = DocumentUpload::new("a.txt", "text/plain", b"x".to_vec());

        let err = client.analyze(&upload).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
