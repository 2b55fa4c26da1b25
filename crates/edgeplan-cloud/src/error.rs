//! Cloud provider error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Resource already exists: {0}")]
    ResourceAlreadyExists(String),

    #[error("Missing required argument: {0}")]
    MissingRequiredArgument(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Provider(Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Wrap a provider-specific error
    pub fn provider(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CloudError::Provider(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Structured error returned by a remote management API.
///
/// Carried through the provider layers unchanged so callers can inspect the
/// remote status code.
#[derive(Error, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[error("Title: {title}; Type: {error_type}; Detail: {detail}")]
pub struct ApiError {
    #[serde(rename = "type", default)]
    pub error_type: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub detail: String,

    #[serde(rename = "status", default)]
    pub status_code: u16,
}

impl ApiError {
    pub fn new(status_code: u16, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status_code,
            ..Default::default()
        }
    }

    /// A bare 404, as returned when the object does not exist
    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }
}
