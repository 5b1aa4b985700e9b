//! Upload intake
//!
//! Turns a chosen file, pasted text, or URL into a [`DocumentUpload`] ready
//! for submission. Every rejection carries the message shown to the user and
//! happens before any network traffic.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// 10 MB upload ceiling
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Minimum length of pasted text, counted after trimming
pub const MIN_PASTE_CHARS: usize = 100;

/// Document name recorded for pasted text
pub const PASTED_TEXT_NAME: &str = "Pasted Text";

/// MIME types accepted under [`PolicyMode::Strict`]
pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "text/plain",
];

const TEXT_PLAIN: &str = "text/plain";

/// Validation errors. `Display` is the user-facing alert text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Please upload a PDF, Word document, or text file.")]
    UnsupportedType(String),

    #[error("File size must be less than {}MB.", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },

    #[error("Please paste at least {min} characters of text.")]
    PasteTooShort { len: usize, min: usize },

    #[error("No selected file")]
    EmptyFileName,

    #[error("Please enter a valid URL.")]
    InvalidUrl(String),

    #[error("URL analysis is a premium feature and not implemented in this demo.")]
    UrlAnalysisUnavailable(String),
}

/// Whether file uploads are checked against the MIME allow-list and size ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    #[default]
    Strict,
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub mode: PolicyMode,
    pub max_bytes: u64,
    pub min_paste_chars: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// A document ready to be posted as the `document` multipart field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, mime_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: normalize_mime(mime_type),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_plain_text(&self) -> bool {
        self.mime_type == TEXT_PLAIN
    }

    /// Text kept as chat context. Binary formats yield an empty string.
    pub fn document_text(&self) -> String {
        if self.is_plain_text() {
            String::from_utf8_lossy(&self.bytes).into_owned()
        } else {
            String::new()
        }
    }
}

impl UploadPolicy {
    pub fn strict() -> Self {
        Self {
            mode: PolicyMode::Strict,
            max_bytes: MAX_UPLOAD_BYTES,
            min_paste_chars: MIN_PASTE_CHARS,
        }
    }

    pub fn lenient() -> Self {
        Self {
            mode: PolicyMode::Lenient,
            ..Self::strict()
        }
    }

    /// Largest file accepted, or `None` when sizes are not checked
    pub fn size_limit(&self) -> Option<u64> {
        match self.mode {
            PolicyMode::Strict => Some(self.max_bytes),
            PolicyMode::Lenient => None,
        }
    }

    /// Type check on its own, usable before the file body has been read
    pub fn check_type(&self, mime_type: &str) -> Result<(), IntakeError> {
        if self.mode == PolicyMode::Lenient {
            return Ok(());
        }

        let mime_type = normalize_mime(mime_type);
        if ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            Ok(())
        } else {
            Err(IntakeError::UnsupportedType(mime_type))
        }
    }

    /// Validate a user-chosen file
    pub fn check_file(&self, upload: &DocumentUpload) -> Result<(), IntakeError> {
        if upload.file_name.trim().is_empty() {
            return Err(IntakeError::EmptyFileName);
        }

        if self.mode == PolicyMode::Lenient {
            return Ok(());
        }

        if let Err(err) = self.check_type(&upload.mime_type) {
            debug!("Rejected upload {} with type {}", upload.file_name, upload.mime_type);
            return Err(err);
        }

        if upload.size() > self.max_bytes {
            debug!("Rejected upload {} of {} bytes", upload.file_name, upload.size());
            return Err(IntakeError::TooLarge {
                size: upload.size(),
                limit: self.max_bytes,
            });
        }

        Ok(())
    }

    /// Wrap pasted text as a plain-text upload.
    ///
    /// Only the length check trims; the text is sent as pasted.
    pub fn accept_paste(&self, text: &str) -> Result<DocumentUpload, IntakeError> {
        let len = text.trim().chars().count();
        if len < self.min_paste_chars {
            return Err(IntakeError::PasteTooShort {
                len,
                min: self.min_paste_chars,
            });
        }

        Ok(DocumentUpload::new(
            PASTED_TEXT_NAME,
            TEXT_PLAIN,
            text.as_bytes().to_vec(),
        ))
    }
}

/// Validate a document URL and return the error to show for it.
///
/// Fetching remote documents is not offered, so a well-formed URL is still
/// declined, just with a different message than a malformed one.
pub fn request_url_analysis(raw: &str) -> IntakeError {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) => IntakeError::UrlAnalysisUnavailable(url.to_string()),
        Err(_) => IntakeError::InvalidUrl(raw.to_string()),
    }
}

/// Lowercase and drop parameters, so "Text/Plain; charset=utf-8" matches
fn normalize_mime(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pdf(size: usize) -> DocumentUpload {
        DocumentUpload::new("Lease.pdf", "application/pdf", vec![0u8; size])
    }

    #[test]
    fn test_accepts_allowed_types() {
        let policy = UploadPolicy::strict();
        for mime in ALLOWED_MIME_TYPES {
            let upload = DocumentUpload::new("doc", mime, b"content".to_vec());
            assert!(policy.check_file(&upload).is_ok(), "{} should be accepted", mime);
        }
    }

    #[test]
    fn test_rejects_image_upload() {
        let upload = DocumentUpload::new("photo.png", "image/png", vec![1, 2, 3]);
        let err = UploadPolicy::strict().check_file(&upload).unwrap_err();

        assert_eq!(err, IntakeError::UnsupportedType("image/png".into()));
        assert_eq!(
            err.to_string(),
            "Please upload a PDF, Word document, or text file."
        );
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let policy = UploadPolicy::strict();
        assert!(policy.check_file(&pdf(MAX_UPLOAD_BYTES as usize)).is_ok());

        let err = policy.check_file(&pdf(MAX_UPLOAD_BYTES as usize + 1)).unwrap_err();
        assert_eq!(err.to_string(), "File size must be less than 10MB.");
    }

    #[test]
    fn test_lenient_policy_skips_type_and_size() {
        let upload = DocumentUpload::new("photo.png", "image/png", vec![0u8; 11 * 1024 * 1024]);
        assert!(UploadPolicy::lenient().check_file(&upload).is_ok());
    }

    #[test]
    fn test_size_limit_only_in_strict_mode() {
        assert_eq!(UploadPolicy::strict().size_limit(), Some(MAX_UPLOAD_BYTES));
        assert_eq!(UploadPolicy::lenient().size_limit(), None);
    }

    #[test]
    fn test_type_checked_before_reading_body() {
        let policy = UploadPolicy::strict();
        assert!(policy.check_type("Application/PDF").is_ok());
        assert_eq!(
            policy.check_type("image/jpeg; quality=high"),
            Err(IntakeError::UnsupportedType("image/jpeg".into()))
        );
        assert!(UploadPolicy::lenient().check_type("image/jpeg").is_ok());
    }

    #[test]
    fn test_empty_file_name_rejected_in_both_modes() {
        let upload = DocumentUpload::new("  ", "text/plain", b"x".to_vec());
        assert_eq!(
            UploadPolicy::strict().check_file(&upload),
            Err(IntakeError::EmptyFileName)
        );
        assert_eq!(
            UploadPolicy::lenient().check_file(&upload),
            Err(IntakeError::EmptyFileName)
        );
    }

    #[test]
    fn test_mime_parameters_are_ignored() {
        let upload = DocumentUpload::new("notes.txt", "Text/Plain; charset=utf-8", b"x".to_vec());
        assert_eq!(upload.mime_type, "text/plain");
        assert!(UploadPolicy::strict().check_file(&upload).is_ok());
    }

    #[test]
    fn test_short_paste_blocked() {
        let err = UploadPolicy::strict().accept_paste("too short").unwrap_err();
        assert_eq!(err, IntakeError::PasteTooShort { len: 9, min: 100 });
        assert_eq!(err.to_string(), "Please paste at least 100 characters of text.");
    }

    #[test]
    fn test_paste_length_counts_trimmed_text() {
        let padded = format!("   {}   ", "a".repeat(99));
        assert!(UploadPolicy::strict().accept_paste(&padded).is_err());
    }

    #[test]
    fn test_paste_becomes_plain_text_upload() {
        let text = "The tenant shall pay rent on the first day of each month. ".repeat(3);
        let upload = UploadPolicy::strict().accept_paste(&text).unwrap();

        assert_eq!(upload.file_name, PASTED_TEXT_NAME);
        assert_eq!(upload.mime_type, "text/plain");
        assert_eq!(upload.document_text(), text);
    }

    #[test]
    fn test_paste_keeps_surrounding_whitespace() {
        let text = format!("\n  {}  \n", "Rent is due on the first of the month. ".repeat(3));
        let upload = UploadPolicy::strict().accept_paste(&text).unwrap();

        assert_eq!(upload.bytes, text.as_bytes());
        assert_eq!(upload.size(), text.len() as u64);
    }

    #[test]
    fn test_binary_upload_has_no_document_text() {
        assert_eq!(pdf(16).document_text(), "");
    }

    #[test]
    fn test_url_requests_are_declined() {
        assert!(matches!(
            request_url_analysis("not a url"),
            IntakeError::InvalidUrl(_)
        ));
        assert!(matches!(
            request_url_analysis(" https://docs.example.com/lease "),
            IntakeError::UrlAnalysisUnavailable(_)
        ));
    }
}
