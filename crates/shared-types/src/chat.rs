//! Wire types for the question-answering endpoint

use serde::{Deserialize, Serialize};

/// Body of `POST /askQuestion`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
    /// Full text of the analysed document
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionResponse {
    pub answer: String,
}
