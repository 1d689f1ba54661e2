//! Error types for the Blaze service

use thiserror::Error;

use crate::models::stack::StackId;

/// Main error type for the Blaze service
#[derive(Error, Debug)]
pub enum BlazeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures while enumerating stacks or fetching their documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no stacks found")]
    NoStacksFound,

    #[error("no stack file found for stack {stack_id}")]
    NoDocumentFound { stack_id: StackId },

    #[error("stack file of stack {stack_id} is not a valid compose document: {reason}")]
    InvalidDocument { stack_id: StackId, reason: String },

    #[error("orchestration platform unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::UpstreamUnavailable(err.without_url().to_string())
    }
}

/// Reasons a notification is rejected before any platform call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("ignoring invalid action {0:?}")]
    InvalidAction(Option<String>),

    #[error("invalid payload, missing package_url")]
    MissingArtifactLocator,
}

/// A redeploy request that failed for one stack
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("update of stack {stack_name} ({stack_id}) failed: {reason}")]
pub struct DispatchFailure {
    pub stack_id: StackId,
    pub stack_name: String,
    pub reason: String,
}
