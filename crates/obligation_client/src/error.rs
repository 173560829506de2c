use shared::{error::ApiException, protocol::CollectionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint} answered {source}")]
    Api {
        endpoint: String,
        source: ApiException,
    },
    #[error("unexpected {endpoint} response body: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
    #[error("malformed {endpoint} collection: {source}")]
    MalformedCollection {
        endpoint: String,
        source: CollectionError,
    },
}

impl ClientError {
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::InvalidBaseUrl { .. } => None,
            Self::Transport { endpoint, .. }
            | Self::Api { endpoint, .. }
            | Self::Decode { endpoint, .. }
            | Self::MalformedCollection { endpoint, .. } => Some(endpoint),
        }
    }

    /// HTTP status of the failed call, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { source, .. } => source.status,
            Self::Transport { source, .. } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
