use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::keys::KeyError;
use crate::signing::{AlgorithmError, SignerError};

/// Failure class reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The request, its configuration or the key material it names is bad.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Anything else.
    #[serde(rename = "ERROR")]
    Generic,
}

/// Error document written to stderr when a command fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    #[serde(rename = "errorCode")]
    pub code: ErrorCode,
    #[serde(rename = "errorMessage")]
    pub message: String,
    #[serde(
        rename = "errorMetadata",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub metadata: BTreeMap<String, String>,
}

impl RequestError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Generic, message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("failed to unmarshal request input: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("failed to extract key spec: {0}")]
    KeySpec(#[source] AlgorithmError),
    #[error("failed to get signature algorithm: {0}")]
    Algorithm(#[source] AlgorithmError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error("failed to marshal response: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("{0}")]
    Usage(String),
    #[error("{0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl PluginError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PluginError::Decode(_)
            | PluginError::InvalidRequest(_)
            | PluginError::KeySpec(_)
            | PluginError::Algorithm(_) => ErrorCode::Validation,
            PluginError::Key(e) if e.is_validation() => ErrorCode::Validation,
            PluginError::Key(_)
            | PluginError::Signer(_)
            | PluginError::Encode(_)
            | PluginError::Usage(_)
            | PluginError::Unexpected(_) => ErrorCode::Generic,
        }
    }
}

impl From<PluginError> for RequestError {
    fn from(error: PluginError) -> Self {
        let request_error = RequestError::new(error.code(), error.to_string());
        match &error {
            PluginError::Usage(_) => request_error.with_metadata("kind", "usage"),
            _ => request_error,
        }
    }
}
