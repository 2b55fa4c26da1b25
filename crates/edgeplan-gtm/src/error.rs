//! GTM provider error types

use edgeplan_cloud::{ApiError, CloudError};
use thiserror::Error;

/// Remote operation an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    WaitForCompletion,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::WaitForCompletion => "wait for completion",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum GtmError {
    #[error("{kind} already exists error")]
    AlreadyExists { kind: &'static str },

    #[error("{kind} {operation} error: {source}")]
    Api {
        kind: &'static str,
        operation: Operation,
        #[source]
        source: ApiError,
    },

    #[error("{kind} {operation} error: {message}")]
    Denied {
        kind: &'static str,
        operation: Operation,
        message: String,
    },

    #[error("datacenter {datacenter_id} does not exist in domain {domain}")]
    DatacenterNotFound { domain: String, datacenter_id: i64 },

    #[error("domain {domain} did not finish propagating after {polls} status checks")]
    PropagationTimeout { domain: String, polls: u32 },

    #[error("invalid resource ID: {0}")]
    InvalidImportId(String),

    #[error("invalid {kind} configuration: {message}")]
    InvalidConfig { kind: &'static str, message: String },
}

impl GtmError {
    pub(crate) fn api(kind: &'static str, operation: Operation) -> impl FnOnce(ApiError) -> Self {
        move |source| GtmError::Api {
            kind,
            operation,
            source,
        }
    }
}

impl From<GtmError> for CloudError {
    fn from(err: GtmError) -> Self {
        CloudError::provider(err)
    }
}

pub type Result<T> = std::result::Result<T, GtmError>;
