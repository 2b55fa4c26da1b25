//! `gtm_geomap` resource

use crate::client::{
    CreateGeoMapRequest, CreateMapsDefaultDatacenterRequest, DatacenterBase, DeleteGeoMapRequest,
    GeoAssignment, GeoMap, GetDatacenterRequest, GetGeoMapRequest, Gtm, ResponseStatus,
    UpdateGeoMapRequest,
};
use crate::config::{decode, default_true, domain_and_name, recorded_wait_on_complete, state_id};
use crate::error::{GtmError, Operation, Result};
use crate::status::{StatusPoll, check_denied, wait_for_completion};
use async_trait::async_trait;
use edgeplan_cloud::{Attribute, AttributeKind, ManagedResource, ResourceSchema, ResourceState};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

pub const GEOMAP_TYPE: &str = "gtm_geomap";

/// Datacenter id reserved for the default datacenter of geographic maps
pub const MAPS_DEFAULT_DATACENTER_ID: i64 = 5400;

const KIND: &str = "geoMap";

#[derive(Debug, Deserialize)]
struct GeoMapConfig {
    domain: String,
    name: String,
    #[serde(default)]
    default_datacenter: Vec<DatacenterBlock>,
    #[serde(default)]
    assignment: Vec<AssignmentBlock>,
    #[serde(default = "default_true")]
    wait_on_complete: bool,
}

#[derive(Debug, Deserialize)]
struct DatacenterBlock {
    datacenter_id: i64,
    #[serde(default)]
    nickname: String,
}

#[derive(Debug, Deserialize)]
struct AssignmentBlock {
    datacenter_id: i64,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    countries: Vec<String>,
}

impl GeoMapConfig {
    fn parse(config: &Value) -> Result<Self> {
        let parsed: Self = decode(KIND, config)?;
        if parsed.default_datacenter.len() != 1 {
            return Err(GtmError::InvalidConfig {
                kind: KIND,
                message: "exactly one default_datacenter block is required".to_string(),
            });
        }
        Ok(parsed)
    }

    fn to_geo_map(&self) -> GeoMap {
        GeoMap {
            name: self.name.clone(),
            default_datacenter: self.default_datacenter.first().map(|dc| DatacenterBase {
                datacenter_id: dc.datacenter_id,
                nickname: dc.nickname.clone(),
            }),
            assignments: self
                .assignment
                .iter()
                .map(|a| GeoAssignment {
                    datacenter: DatacenterBase {
                        datacenter_id: a.datacenter_id,
                        nickname: a.nickname.clone(),
                    },
                    countries: a.countries.clone(),
                })
                .collect(),
            links: Vec::new(),
        }
    }
}

/// Attribute schema of `gtm_geomap`
pub fn geomap_schema() -> ResourceSchema {
    let datacenter = || {
        vec![
            Attribute::value("datacenter_id"),
            Attribute::value("nickname"),
        ]
    };

    let mut assignment = datacenter();
    assignment.push(Attribute::set("countries", AttributeKind::Value));

    ResourceSchema::new(vec![
        Attribute::value("id").computed(),
        Attribute::value("domain").force_new(),
        Attribute::value("name").force_new(),
        Attribute::block("default_datacenter", datacenter()),
        Attribute::set("assignment", AttributeKind::Block(assignment)),
        Attribute::value("wait_on_complete").with_default(json!(true)),
    ])
}

/// Recorded attributes of a geographic map
fn attributes(domain: &str, geo_map: &GeoMap, wait_on_complete: bool) -> Value {
    let default_datacenter: Vec<Value> = geo_map
        .default_datacenter
        .iter()
        .map(|dc| json!({"datacenter_id": dc.datacenter_id, "nickname": dc.nickname}))
        .collect();

    let assignment: Vec<Value> = geo_map
        .assignments
        .iter()
        .map(|a| {
            json!({
                "datacenter_id": a.datacenter.datacenter_id,
                "nickname": a.datacenter.nickname,
                "countries": a.countries,
            })
        })
        .collect();

    json!({
        "domain": domain,
        "name": geo_map.name,
        "default_datacenter": default_datacenter,
        "assignment": assignment,
        "wait_on_complete": wait_on_complete,
    })
}

/// Geographic map of a GTM domain
pub struct GeoMapResource {
    client: Arc<dyn Gtm>,
    poll: StatusPoll,
    schema: ResourceSchema,
}

impl GeoMapResource {
    pub fn new(client: Arc<dyn Gtm>) -> Self {
        Self {
            client,
            poll: StatusPoll::default(),
            schema: geomap_schema(),
        }
    }

    pub fn with_status_poll(mut self, poll: StatusPoll) -> Self {
        self.poll = poll;
        self
    }

    /// The map, or `None` on 404
    async fn fetch(&self, domain: &str, name: &str) -> Result<Option<GeoMap>> {
        tracing::debug!(domain, name, "reading geo map");
        match self
            .client
            .get_geo_map(GetGeoMapRequest {
                domain_name: domain.to_string(),
                map_name: name.to_string(),
            })
            .await
        {
            Ok(geo_map) => Ok(Some(geo_map)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(GtmError::api(KIND, Operation::Read)(e)),
        }
    }

    /// The default datacenter must exist; the reserved maps datacenter is
    /// created on demand
    async fn ensure_default_datacenter(&self, domain: &str, datacenter: &DatacenterBase) -> Result<()> {
        let lookup = self
            .client
            .get_datacenter(GetDatacenterRequest {
                domain_name: domain.to_string(),
                datacenter_id: datacenter.datacenter_id,
            })
            .await;

        match lookup {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() && datacenter.datacenter_id == MAPS_DEFAULT_DATACENTER_ID => {
                tracing::info!(domain, "creating maps default datacenter");
                self.client
                    .create_maps_default_datacenter(CreateMapsDefaultDatacenterRequest {
                        domain_name: domain.to_string(),
                    })
                    .await
                    .map_err(GtmError::api(KIND, Operation::Create))?;
                Ok(())
            }
            Err(e) if e.is_not_found() => Err(GtmError::DatacenterNotFound {
                domain: domain.to_string(),
                datacenter_id: datacenter.datacenter_id,
            }),
            Err(e) => Err(GtmError::api(KIND, Operation::Create)(e)),
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
impl ManagedResource for GeoMapResource {
    fn type_name(&self) -> &'static str {
        GEOMAP_TYPE
    }

    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(&self, config: &Value) -> edgeplan_cloud::Result<ResourceState> {
        let config = GeoMapConfig::parse(config)?;
        let domain = config.domain.as_str();

        if self.fetch(domain, &config.name).await?.is_some() {
            return Err(GtmError::AlreadyExists { kind: KIND }.into());
        }

        let geo_map = config.to_geo_map();
        if let Some(datacenter) = &geo_map.default_datacenter {
            self.ensure_default_datacenter(domain, datacenter).await?;
        }

        tracing::info!(domain, name = %geo_map.name, "creating geo map");
        let response = self
            .client
            .create_geo_map(CreateGeoMapRequest {
                domain_name: domain.to_string(),
                geo_map,
            })
            .await
            .map_err(GtmError::api(KIND, Operation::Create))?;

        self.finish_change(Operation::Create, domain, &response.status, config.wait_on_complete)
            .await?;

        Ok(ResourceState::new(
            state_id(domain, &config.name),
            GEOMAP_TYPE,
            attributes(domain, &response.resource, config.wait_on_complete),
        ))
    }

    async fn read(&self, state: &ResourceState) -> edgeplan_cloud::Result<Option<ResourceState>> {
        let (domain, name) = domain_and_name(&state.id)?;
        let wait_on_complete = recorded_wait_on_complete(state);

        Ok(self.fetch(&domain, &name).await?.map(|geo_map| {
            ResourceState::new(
                state.id.clone(),
                GEOMAP_TYPE,
                attributes(&domain, &geo_map, wait_on_complete),
            )
        }))
    }

    async fn update(
        &self,
        config: &Value,
        state: &ResourceState,
    ) -> edgeplan_cloud::Result<ResourceState> {
        let config = GeoMapConfig::parse(config)?;
        let domain = config.domain.as_str();
        let geo_map = config.to_geo_map();

        tracing::info!(domain, name = %geo_map.name, "updating geo map");
        let response = self
            .client
            .update_geo_map(UpdateGeoMapRequest {
                domain_name: domain.to_string(),
                geo_map: geo_map.clone(),
            })
            .await
            .map_err(GtmError::api(KIND, Operation::Update))?;

        self.finish_change(Operation::Update, domain, &response.status, config.wait_on_complete)
            .await?;

        Ok(ResourceState::new(
            state.id.clone(),
            GEOMAP_TYPE,
            attributes(domain, &geo_map, config.wait_on_complete),
        ))
    }

    async fn delete(&self, state: &ResourceState) -> edgeplan_cloud::Result<()> {
        let (domain, name) = domain_and_name(&state.id)?;

        tracing::info!(domain = %domain, name = %name, "deleting geo map");
        let response = match self
            .client
            .delete_geo_map(DeleteGeoMapRequest {
                domain_name: domain.clone(),
                map_name: name,
            })
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_not_found() => {
                tracing::warn!("geo map {} is already gone", state.id);
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

        let geo_map = self
            .client
            .get_geo_map(GetGeoMapRequest {
                domain_name: domain.clone(),
                map_name: name.clone(),
            })
            .await
            .map_err(GtmError::api(KIND, Operation::Read))?;

        Ok(ResourceState::new(
            state_id(&domain, &name),
            GEOMAP_TYPE,
            attributes(&domain, &geo_map, true),
        ))
    }
}
