pub mod chat;
pub mod error;
pub mod types;

pub use chat::{AskQuestionRequest, AskQuestionResponse};
pub use error::DecodeError;
pub use types::{AnalysisResult, KeyClause, RiskFlag, RiskLevel};
