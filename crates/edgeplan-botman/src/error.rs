//! Bot manager error types

use edgeplan_cloud::{ApiError, CloudError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotmanError {
    /// Remote failures surface exactly as the API reported them
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid resource ID: {0}")]
    InvalidImportId(String),

    #[error("invalid {kind} configuration: {message}")]
    InvalidConfig { kind: &'static str, message: String },
}

impl From<BotmanError> for CloudError {
    fn from(err: BotmanError) -> Self {
        CloudError::provider(err)
    }
}

pub type Result<T> = std::result::Result<T, BotmanError>;
