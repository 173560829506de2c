use serde::Deserialize;
use thiserror::Error;

/// JSON error body some ledger endpoints answer with on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<String>,
    pub message: String,
}

impl ApiError {
    /// Extracts the human-readable message from a response body, if the
    /// body is a JSON error object.
    pub fn parse_message(body: &str) -> Option<String> {
        serde_json::from_str::<ApiError>(body)
            .ok()
            .map(|err| err.message)
    }
}

#[derive(Debug, Error)]
#[error("{}: {message}", status_label(.status))]
pub struct ApiException {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiException {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

fn status_label(status: &Option<u16>) -> String {
    status
        .map(|code| code.to_string())
        .unwrap_or_else(|| "error".to_string())
}
