//! Error taxonomy for the store client.

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("You are already logged in")]
    AlreadyAuthenticated,

    #[error("You are not logged in")]
    NotAuthenticated,

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("HTTP error: {status}")]
    Upstream { status: String },

    #[error("Malformed response ({length} bytes): {reason}")]
    MalformedResponse { reason: String, length: usize },

    #[error("Device identity unavailable: {0}")]
    Environment(String),

    #[error("Failed to encode request payload: {0}")]
    Encode(String),

    #[error("Credential file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential format error: {0}")]
    Credential(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn malformed(reason: impl Into<String>, length: usize) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            length,
        }
    }

    /// Short, stable name of the error kind, suitable for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::AlreadyAuthenticated => "already_authenticated",
            StoreError::NotAuthenticated => "not_authenticated",
            StoreError::Transport(_) => "transport",
            StoreError::Upstream { .. } => "upstream",
            StoreError::MalformedResponse { .. } => "malformed_response",
            StoreError::Environment(_) => "environment",
            StoreError::Encode(_) => "encode",
            StoreError::Io(_) => "io",
            StoreError::Credential(_) => "credential",
        }
    }
}
