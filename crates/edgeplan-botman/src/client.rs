//! Bot manager API client interface and types

use async_trait::async_trait;
use edgeplan_cloud::ApiError;
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Ordered content protection rule ids of a security policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProtectionRuleUuidSequence {
    #[serde(default)]
    pub content_protection_rule_sequence: Vec<String>,
}

impl ContentProtectionRuleUuidSequence {
    pub fn new<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            content_protection_rule_sequence: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetContentProtectionRuleSequenceRequest {
    pub config_id: i64,
    pub version: i64,
    pub security_policy_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateContentProtectionRuleSequenceRequest {
    pub config_id: i64,
    pub version: i64,
    pub security_policy_id: String,
    pub content_protection_rule_sequence: ContentProtectionRuleUuidSequence,
}

/// Security configuration whose version is looked up
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigVersionRequest {
    pub config_id: i64,
}

/// Operations of the bot manager API used by the resources
#[async_trait]
pub trait Botman: Send + Sync {
    async fn get_content_protection_rule_sequence(
        &self,
        request: GetContentProtectionRuleSequenceRequest,
    ) -> ApiResult<ContentProtectionRuleUuidSequence>;

    async fn update_content_protection_rule_sequence(
        &self,
        request: UpdateContentProtectionRuleSequenceRequest,
    ) -> ApiResult<ContentProtectionRuleUuidSequence>;

    /// Version that may be written to, cloning the active one when needed
    async fn modifiable_config_version(&self, request: ConfigVersionRequest) -> ApiResult<i64>;

    /// Most recent version, used for reads
    async fn latest_config_version(&self, request: ConfigVersionRequest) -> ApiResult<i64>;
}
