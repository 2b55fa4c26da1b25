//! `gtm_resource` resource

use crate::client::{
    CreateResourceRequest, DeleteResourceRequest, GetResourceRequest, Gtm, LoadObject, Resource,
    ResourceInstance, ResponseStatus, UpdateResourceRequest,
};
use crate::config::{decode, default_true, domain_and_name, recorded_wait_on_complete, state_id};
use crate::error::{GtmError, Operation, Result};
use crate::status::{StatusPoll, check_denied, wait_for_completion};
use async_trait::async_trait;
use edgeplan_cloud::{Attribute, AttributeKind, ManagedResource, ResourceSchema, ResourceState};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const RESOURCE_TYPE: &str = "gtm_resource";

const KIND: &str = "resource";

#[derive(Debug, Deserialize)]
struct ResourceConfigBlock {
    domain: String,
    name: String,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default)]
    host_header: String,
    #[serde(default)]
    least_squares_decay: f64,
    #[serde(default)]
    description: String,
    #[serde(default)]
    leader_string: String,
    #[serde(default)]
    constrained_property: String,
    #[serde(default)]
    aggregation_type: String,
    #[serde(default)]
    load_imbalance_percentage: f64,
    #[serde(default)]
    upper_bound: i64,
    #[serde(default)]
    max_u_multiplicative_increment: f64,
    #[serde(default)]
    decay_rate: f64,
    #[serde(default)]
    resource_instance: Vec<InstanceBlock>,
    #[serde(default = "default_true")]
    wait_on_complete: bool,
}

#[derive(Debug, Deserialize)]
struct InstanceBlock {
    datacenter_id: i64,
    #[serde(default)]
    use_default_load_object: bool,
    #[serde(default)]
    load_object: String,
    #[serde(default)]
    load_object_port: i64,
    #[serde(default)]
    load_servers: Vec<String>,
}

impl ResourceConfigBlock {
    fn to_resource(&self) -> Resource {
        Resource {
            name: self.name.clone(),
            resource_type: self.resource_type.clone(),
            host_header: self.host_header.clone(),
            least_squares_decay: self.least_squares_decay,
            description: self.description.clone(),
            leader_string: self.leader_string.clone(),
            constrained_property: self.constrained_property.clone(),
            aggregation_type: self.aggregation_type.clone(),
            load_imbalance_percentage: self.load_imbalance_percentage,
            upper_bound: self.upper_bound,
            max_u_multiplicative_increment: self.max_u_multiplicative_increment,
            decay_rate: self.decay_rate,
            resource_instances: self
                .resource_instance
                .iter()
                .map(|i| ResourceInstance {
                    datacenter_id: i.datacenter_id,
                    use_default_load_object: i.use_default_load_object,
                    load_object: LoadObject {
                        load_object: i.load_object.clone(),
                        load_object_port: i.load_object_port,
                        load_servers: i.load_servers.clone(),
                    },
                })
                .collect(),
            links: Vec::new(),
        }
    }
}

/// Attribute schema of `gtm_resource`
pub fn resource_schema() -> ResourceSchema {
    let instance = AttributeKind::Block(vec![
        Attribute::value("datacenter_id"),
        Attribute::value("use_default_load_object").with_default(json!(false)),
        Attribute::value("load_object"),
        Attribute::value("load_object_port"),
        Attribute::set("load_servers", AttributeKind::Value),
    ]);

    ResourceSchema::new(vec![
        Attribute::value("id").computed(),
        Attribute::value("domain").force_new(),
        Attribute::value("name").force_new(),
        Attribute::value("type"),
        Attribute::value("host_header"),
        Attribute::value("least_squares_decay"),
        Attribute::value("description"),
        Attribute::value("leader_string"),
        Attribute::value("constrained_property"),
        Attribute::value("aggregation_type"),
        Attribute::value("load_imbalance_percentage"),
        Attribute::value("upper_bound"),
        Attribute::value("max_u_multiplicative_increment"),
        Attribute::value("decay_rate"),
        Attribute::set("resource_instance", instance),
        Attribute::value("wait_on_complete").with_default(json!(true)),
    ])
}

fn attributes(domain: &str, resource: &Resource, wait_on_complete: bool) -> Value {
    let instances: Vec<Value> = resource
        .resource_instances
        .iter()
        .map(|i| {
            json!({
                "datacenter_id": i.datacenter_id,
                "use_default_load_object": i.use_default_load_object,
                "load_object": i.load_object.load_object,
                "load_object_port": i.load_object.load_object_port,
                "load_servers": i.load_object.load_servers,
            })
        })
        .collect();

    json!({
        "domain": domain,
        "name": resource.name,
        "type": resource.resource_type,
        "host_header": resource.host_header,
        "least_squares_decay": resource.least_squares_decay,
        "description": resource.description,
        "leader_string": resource.leader_string,
        "constrained_property": resource.constrained_property,
        "aggregation_type": resource.aggregation_type,
        "load_imbalance_percentage": resource.load_imbalance_percentage,
        "upper_bound": resource.upper_bound,
        "max_u_multiplicative_increment": resource.max_u_multiplicative_increment,
        "decay_rate": resource.decay_rate,
        "resource_instance": instances,
        "wait_on_complete": wait_on_complete,
    })
}

/// Load feedback resource of a GTM domain
pub struct GtmResource {
    client: Arc<dyn Gtm>,
    poll: StatusPoll,
    schema: ResourceSchema,
}

impl GtmResource {
    pub fn new(client: Arc<dyn Gtm>) -> Self {
        Self {
            client,
            poll: StatusPoll::default(),
            schema: resource_schema(),
        }
    }

    pub fn with_status_poll(mut self, poll: StatusPoll) -> Self {
        self.poll = poll;
        self
    }

    async fn fetch(&self, domain: &str, name: &str) -> Result<Option<Resource>> {
        tracing::debug!(domain, name, "reading resource");
        match self
            .client
            .get_resource(GetResourceRequest {
                domain_name: domain.to_string(),
                resource_name: name.to_string(),
            })
            .await
        {
            Ok(resource) => Ok(Some(resource)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(GtmError::api(KIND, Operation::Read)(e)),
        }
    }

    async fn finish_change(
        &self,
        operation: Operation,
        domain: &str,
        status: &ResponseStatus,
        wait_on_complete: bool,
    ) -> Result<()> {
        check_denied(KIND, operation, status)?;
        if wait_on_complete {
            wait_for_completion(self.client.as_ref(), KIND, domain, &self.poll).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for GtmResource {
    fn type_name(&self) -> &'static str {
        RESOURCE_TYPE
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, config: &Value) -> edgeplan_cloud::Result<ResourceState> {
        let config: ResourceConfigBlock = decode(KIND, config)?;
        let domain = config.domain.as_str();

        if self.fetch(domain, &config.name).await?.is_some() {
            return Err(GtmError::AlreadyExists { kind: KIND }.into());
        }

        tracing::info!(domain, name = %config.name, "creating resource");
        let response = self
            .client
            .create_resource(CreateResourceRequest {
                domain_name: domain.to_string(),
                resource: config.to_resource(),
            })
            .await
            .map_err(GtmError::api(KIND, Operation::Create))?;

        self.finish_change(Operation::Create, domain, &response.status, config.wait_on_complete)
            .await?;

        Ok(ResourceState::new(
            state_id(domain, &config.name),
            RESOURCE_TYPE,
            attributes(domain, &response.resource, config.wait_on_complete),
        ))
    }

    async fn read(&self, state: &ResourceState) -> edgeplan_cloud::Result<Option<ResourceState>> {
        let (domain, name) = domain_and_name(&state.id)?;
        let wait_on_complete = recorded_wait_on_complete(state);

        Ok(self.fetch(&domain, &name).await?.map(|resource| {
            ResourceState::new(
                state.id.clone(),
                RESOURCE_TYPE,
                attributes(&domain, &resource, wait_on_complete),
            )
        }))
    }

    async fn update(
        &self,
        config: &Value,
        state: &ResourceState,
    ) -> edgeplan_cloud::Result<ResourceState> {
        let config: ResourceConfigBlock = decode(KIND, config)?;
        let domain = config.domain.as_str();
        let resource = config.to_resource();

        tracing::info!(domain, name = %resource.name, "updating resource");
        let response = self
            .client
            .update_resource(UpdateResourceRequest {
                domain_name: domain.to_string(),
                resource: resource.clone(),
            })
            .await
            .map_err(GtmError::api(KIND, Operation::Update))?;

        self.finish_change(Operation::Update, domain, &response.status, config.wait_on_complete)
            .await?;

        Ok(ResourceState::new(
            state.id.clone(),
            RESOURCE_TYPE,
            attributes(domain, &resource, config.wait_on_complete),
        ))
    }

    async fn delete(&self, state: &ResourceState) -> edgeplan_cloud::Result<()> {
        let (domain, name) = domain_and_name(&state.id)?;

        tracing::info!(domain = %domain, name = %name, "deleting resource");
        let response = match self
            .client
            .delete_resource(DeleteResourceRequest {
                domain_name: domain.clone(),
                resource_name: name,
            })
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::warn!("resource {} is already gone", state.id);
                return Ok(());
            }
            Err(e) => return Err(GtmError::api(KIND, Operation::Delete)(e).into()),
        };

        self.finish_change(
            Operation::Delete,
            &domain,
            &response.status,
            recorded_wait_on_complete(state),
        )
        .await?;
        Ok(())
    }

    async fn import(&self, import_id: &str) -> edgeplan_cloud::Result<ResourceState> {
        let (domain, name) = domain_and_name(import_id)?;

        let resource = self
            .client
            .get_resource(GetResourceRequest {
                domain_name: domain.clone(),
                resource_name: name.clone(),
            })
            .await
            .map_err(GtmError::api(KIND, Operation::Read))?;

        Ok(ResourceState::new(
            state_id(&domain, &name),
            RESOURCE_TYPE,
            attributes(&domain, &resource, true),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeplan_cloud::diff;

    fn config() -> Value {
        json!({
            "domain": "test_domain",
            "name": "tfexample_resource_1",
            "type": "XML load object via HTTP",
            "aggregation_type": "latest",
            "least_squares_decay": 1,
            "upper_bound": 5,
            "resource_instance": [{
                "datacenter_id": 3131,
                "load_object": "/test1",
                "load_object_port": 80,
                "load_servers": ["1.2.3.4", "1.2.3.5"],
            }],
        })
    }

    #[test]
    fn test_recorded_attributes_match_config() {
        let block: ResourceConfigBlock = decode(KIND, &config()).unwrap();
        let recorded = attributes("test_domain", &block.to_resource(), true);

        assert_eq!(recorded["least_squares_decay"], json!(1.0));
        assert!(diff(&resource_schema(), &config(), &recorded).is_empty());
    }

    #[test]
    fn test_missing_type_is_invalid() {
        let mut config = config();
        config.as_object_mut().unwrap().remove("type");
        let err = decode::<ResourceConfigBlock>(KIND, &config).unwrap_err();
        assert!(err.to_string().contains("missing field `type`"));
    }
}
