//! `botman_content_protection_rule_sequence` resource
//!
//! The sequence is a property of its security policy: it always exists, so
//! create and update both write it and delete only forgets it.

use crate::client::{
    Botman, ConfigVersionRequest, ContentProtectionRuleUuidSequence,
    GetContentProtectionRuleSequenceRequest, UpdateContentProtectionRuleSequenceRequest,
};
use crate::error::{BotmanError, Result};
use async_trait::async_trait;
use edgeplan_cloud::{
    Attribute, AttributeKind, ManagedResource, ResourceSchema, ResourceState, split_import_id,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const CONTENT_PROTECTION_RULE_SEQUENCE_TYPE: &str = "botman_content_protection_rule_sequence";

const KIND: &str = "content protection rule sequence";

#[derive(Debug, Deserialize)]
struct SequenceConfig {
    config_id: i64,
    security_policy_id: String,
    #[serde(default)]
    content_protection_rule_ids: Vec<String>,
}

impl SequenceConfig {
    fn parse(config: &Value) -> Result<Self> {
        serde_json::from_value(config.clone()).map_err(|e| BotmanError::InvalidConfig {
            kind: KIND,
            message: e.to_string(),
        })
    }
}

/// Attribute schema of `botman_content_protection_rule_sequence`
pub fn content_protection_rule_sequence_schema() -> ResourceSchema {
    ResourceSchema::new(vec![
        Attribute::value("id").computed(),
        Attribute::value("config_id").required().force_new(),
        Attribute::value("security_policy_id").required().force_new(),
        Attribute::list("content_protection_rule_ids", AttributeKind::Value).required(),
    ])
}

/// `(config_id, security_policy_id)` from a `config_id:security_policy_id` identifier
fn parse_id(id: &str) -> Result<(i64, String)> {
    let invalid = || BotmanError::InvalidImportId(id.to_string());
    match split_import_id(id, 2).as_deref() {
        Some([config_id, policy]) => {
            let config_id = config_id.parse().map_err(|_| invalid())?;
            Ok((config_id, policy.to_string()))
        }
        _ => Err(invalid()),
    }
}

fn attributes(config_id: i64, security_policy_id: &str, ids: &[String]) -> Value {
    json!({
        "config_id": config_id,
        "security_policy_id": security_policy_id,
        "content_protection_rule_ids": ids,
    })
}

/// Order in which the content protection rules of a policy are evaluated
pub struct ContentProtectionRuleSequence {
    client: Arc<dyn Botman>,
    schema: ResourceSchema,
}

impl ContentProtectionRuleSequence {
    pub fn new(client: Arc<dyn Botman>) -> Self {
        Self {
            client,
            schema: content_protection_rule_sequence_schema(),
        }
    }

    async fn fetch(&self, config_id: i64, security_policy_id: &str) -> Result<Vec<String>> {
        let version = self
            .client
            .latest_config_version(ConfigVersionRequest { config_id })
            .await?;

        tracing::debug!(config_id, version, security_policy_id, "reading {}", KIND);
        let sequence = self
            .client
            .get_content_protection_rule_sequence(GetContentProtectionRuleSequenceRequest {
                config_id,
                version,
                security_policy_id: security_policy_id.to_string(),
            })
            .await?;
        Ok(sequence.content_protection_rule_sequence)
    }

    async fn write(&self, config: &Value) -> Result<ResourceState> {
        let config = SequenceConfig::parse(config)?;
        let version = self
            .client
            .modifiable_config_version(ConfigVersionRequest {
                config_id: config.config_id,
            })
            .await?;

        tracing::info!(
            config_id = config.config_id,
            version,
            security_policy_id = %config.security_policy_id,
            "writing {}",
            KIND
        );
        let written = self
            .client
            .update_content_protection_rule_sequence(UpdateContentProtectionRuleSequenceRequest {
                config_id: config.config_id,
                version,
                security_policy_id: config.security_policy_id.clone(),
                content_protection_rule_sequence: ContentProtectionRuleUuidSequence::new(
                    config.content_protection_rule_ids,
                ),
            })
            .await?;

        Ok(ResourceState::new(
            format!("{}:{}", config.config_id, config.security_policy_id),
            CONTENT_PROTECTION_RULE_SEQUENCE_TYPE,
            attributes(
                config.config_id,
                &config.security_policy_id,
                &written.content_protection_rule_sequence,
            ),
        ))
    }
}

#[async_trait]
impl ManagedResource for ContentProtectionRuleSequence {
    fn type_name(&self) -> &'static str {
        CONTENT_PROTECTION_RULE_SEQUENCE_TYPE
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, config: &Value) -> edgeplan_cloud::Result<ResourceState> {
        Ok(self.write(config).await?)
    }

    async fn read(&self, state: &ResourceState) -> edgeplan_cloud::Result<Option<ResourceState>> {
        let (config_id, policy) = parse_id(&state.id)?;
        let ids = self.fetch(config_id, &policy).await?;
        Ok(Some(ResourceState::new(
            state.id.clone(),
            CONTENT_PROTECTION_RULE_SEQUENCE_TYPE,
            attributes(config_id, &policy, &ids),
        )))
    }

    async fn update(
        &self,
        config: &Value,
        _state: &ResourceState,
    ) -> edgeplan_cloud::Result<ResourceState> {
        Ok(self.write(config).await?)
    }

    async fn delete(&self, state: &ResourceState) -> edgeplan_cloud::Result<()> {
        tracing::info!("{} is left in place; removing {} from state only", KIND, state.id);
        Ok(())
    }

    async fn import(&self, import_id: &str) -> edgeplan_cloud::Result<ResourceState> {
        let (config_id, policy) = parse_id(import_id)?;
        let ids = self.fetch(config_id, &policy).await?;
        Ok(ResourceState::new(
            import_id,
            CONTENT_PROTECTION_RULE_SEQUENCE_TYPE,
            attributes(config_id, &policy, &ids),
        ))
    }
}
