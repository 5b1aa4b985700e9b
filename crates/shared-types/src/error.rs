use thiserror::Error;

/// Errors raised while decoding a payload from the analysis backend
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Unknown risk level '{0}' (expected 'red' or 'yellow')")]
    UnknownRiskLevel(String),

    #[error("Malformed analysis result: {0}")]
    Malformed(#[from] serde_json::Error),
}
