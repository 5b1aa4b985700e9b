//! Submission pipeline
//!
//! validate → analyse → store in the bridge → navigate to the dashboard.
//! Validation failures never reach the network. Transport failures store
//! nothing. There is no retry.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::bridge::{SessionId, SessionStore};
use crate::client::{Analyzer, ClientError};
use crate::intake::{DocumentUpload, IntakeError, UploadPolicy};
use crate::layout::dashboard_location;

/// Alert shown for any transport failure
pub const TRANSPORT_ALERT: &str = "Sorry, something went wrong. Please try again.";

/// Loading indicator copy shown while the request is in flight
pub const LOADING_HEADING: &str = "Analyzing your document...";
pub const LOADING_DETAIL: &str = "This might take a moment.";

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] IntakeError),

    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl SubmitError {
    /// Text for the blocking alert
    pub fn alert_message(&self) -> String {
        match self {
            SubmitError::Validation(err) => err.to_string(),
            SubmitError::Transport(_) => TRANSPORT_ALERT.to_string(),
        }
    }
}

/// A completed submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub session_id: SessionId,
    /// Where the browser goes next
    pub location: String,
}

pub struct SubmissionPipeline {
    policy: UploadPolicy,
    analyzer: Arc<dyn Analyzer>,
    store: Arc<SessionStore>,
}

impl SubmissionPipeline {
    pub fn new(policy: UploadPolicy, analyzer: Arc<dyn Analyzer>, store: Arc<SessionStore>) -> Self {
        Self {
            policy,
            analyzer,
            store,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Submit a user-chosen file
    pub async fn submit_file(&self, upload: DocumentUpload) -> Result<Submission, SubmitError> {
        self.policy.check_file(&upload)?;
        self.submit(upload).await
    }

    /// Submit pasted text
    pub async fn submit_paste(&self, text: &str) -> Result<Submission, SubmitError> {
        let upload = self.policy.accept_paste(text)?;
        self.submit(upload).await
    }

    async fn submit(&self, upload: DocumentUpload) -> Result<Submission, SubmitError> {
        let result = match self.analyzer.analyze(&upload).await {
            Ok(result) => result,
            Err(err) => {
                warn!("Analysis of {} failed: {}", upload.file_name, err);
                return Err(err.into());
            }
        };

        let session_id = self
            .store
            .create(upload.file_name.clone(), upload.document_text(), result);

        info!("Analysis of {} stored as session {}", upload.file_name, session_id);

        Ok(Submission {
            session_id,
            location: dashboard_location(&session_id.to_string()),
        })
    }
}
