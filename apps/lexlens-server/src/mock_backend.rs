//! Stand-in analysis backend
//!
//! Serves `/analyzeDocument` and `/askQuestion` with canned lease data so the
//! whole flow can run without the real analysis service. Every document gets
//! the same result after a simulated processing delay.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use lexlens_core::client::{ANALYZE_PATH, ASK_PATH, DOCUMENT_FIELD};
use lexlens_core::KeywordResponder;
use serde_json::json;
use shared_types::{
    AnalysisResult, AskQuestionRequest, AskQuestionResponse, KeyClause, RiskFlag, RiskLevel,
};
use tracing::{debug, info};

use crate::config::MockConfig;

#[derive(Clone)]
struct MockState {
    analysis_delay: Duration,
    responder: Arc<KeywordResponder>,
}

/// Routes for the mock backend, ready to merge into the main router
pub fn router(config: &MockConfig) -> Router {
    let state = MockState {
        analysis_delay: config.analysis_delay(),
        responder: Arc::new(KeywordResponder::lease_demo()),
    };

    Router::new()
        .route(&format!("/{}", ANALYZE_PATH), post(handle_analyze))
        .route(&format!("/{}", ASK_PATH), post(handle_ask))
        .with_state(state)
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Handler: POST /analyzeDocument
async fn handle_analyze(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut file_name = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return bad_request(&err.to_string()),
        };
        if field.name() == Some(DOCUMENT_FIELD) {
            file_name = Some(field.file_name().unwrap_or_default().to_string());
            break;
        }
    }

    let Some(file_name) = file_name else {
        return bad_request("No document part in the request");
    };
    if file_name.is_empty() {
        return bad_request("No selected file");
    }

    info!("Mock backend received {}, simulating analysis", file_name);
    tokio::time::sleep(state.analysis_delay).await;

    Json(lease_analysis()).into_response()
}

/// Handler: POST /askQuestion
async fn handle_ask(
    State(state): State<MockState>,
    Json(req): Json<AskQuestionRequest>,
) -> Json<AskQuestionResponse> {
    debug!(
        "Mock backend question with {} chars of context",
        req.context.len()
    );
    Json(AskQuestionResponse {
        answer: state.responder.answer(&req.question).to_string(),
    })
}

/// The canned result returned for every document
pub fn lease_analysis() -> AnalysisResult {
    AnalysisResult {
        summary: "This is a standard 12-month residential rental agreement. It outlines your \
                  responsibilities as a tenant and the landlord's obligations. The key financial \
                  components are a monthly rent of ₹25,000 and a security deposit of ₹50,000."
            .to_string(),
        risk_flags: vec![
            RiskFlag {
                level: RiskLevel::Red,
                title: "Automatic Rent Increase Clause".to_string(),
                explanation: "Clause 7.2 allows the landlord to increase the rent by up to 10% \
                              after 6 months with only 15 days notice. This is highly unusual \
                              and not in your favor."
                    .to_string(),
            },
            RiskFlag {
                level: RiskLevel::Yellow,
                title: "Full Maintenance Responsibility".to_string(),
                explanation: "You are responsible for all appliance repairs, including normal \
                              wear and tear (Clause 11.5). You should try to negotiate this to \
                              cover only damages you cause."
                    .to_string(),
            },
        ],
        key_clauses: vec![
            KeyClause {
                title: "Security Deposit (Clause 4.1)".to_string(),
                original_text: "The tenant shall deposit a sum of Fifty Thousand Rupees \
                                (₹50,000) as a security deposit, refundable at the end of the \
                                lease term, subject to deductions for damages."
                    .to_string(),
                simplified_text: "You need to pay a ₹50,000 security deposit. You'll get it \
                                  back when you move out, unless you've damaged the property."
                    .to_string(),
            },
            KeyClause {
                title: "Termination Clause (Clause 15.3)".to_string(),
                original_text: "The tenant must provide a written notice of at least sixty (60) \
                                days prior to the expiration of the lease term to terminate \
                                this agreement."
                    .to_string(),
                simplified_text: "If you want to move out at the end of the year, you must tell \
                                  your landlord in writing at least 2 months beforehand."
                    .to_string(),
            },
        ],
    }
}
