//! LexLens core
//!
//! Everything between the browser and the analysis backend:
//!
//! - [`intake`]: upload, paste and URL validation
//! - [`client`]: the backend HTTP client
//! - [`pipeline`]: submission from validated upload to stored session
//! - [`bridge`]: sessions handed from submission to the dashboard
//! - [`dashboard`]: the dashboard view model and page
//! - [`chat`]: remote and offline question answering

pub mod bridge;
pub mod chat;
pub mod client;
pub mod dashboard;
pub mod intake;
pub mod layout;
pub mod pipeline;

pub use bridge::{AnalysisSession, BridgeEntries, BridgeError, SessionId, SessionStore};
pub use chat::{ChatMessage, ChatRole, ChatState, KeywordResponder, KeywordRule};
pub use client::{AnalysisClient, Analyzer, ClientError, Responder};
pub use dashboard::{render_missing_state, DashboardView};
pub use intake::{DocumentUpload, IntakeError, PolicyMode, UploadPolicy};
pub use pipeline::{Submission, SubmissionPipeline, SubmitError};
