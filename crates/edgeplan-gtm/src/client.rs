//! GTM configuration API client interface and types
//!
//! Types mirror the JSON documents of the GTM configuration API. The
//! transport is out of scope: anything implementing [`Gtm`] can back the
//! resources, and [`crate::mock::MockGtm`] is used in tests.

use async_trait::async_trait;
use edgeplan_cloud::ApiError;
use serde::{Deserialize, Serialize};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Propagation status of a change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
    #[serde(default)]
    pub change_id: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub passing_validation: bool,
    #[serde(default)]
    pub propagation_status: String,
    #[serde(default)]
    pub propagation_status_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterBase {
    pub datacenter_id: i64,
    #[serde(default)]
    pub nickname: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datacenter {
    pub datacenter_id: i64,
    #[serde(default)]
    pub nickname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub continent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoAssignment {
    #[serde(flatten)]
    pub datacenter: DatacenterBase,
    #[serde(default)]
    pub countries: Vec<String>,
}

/// Geographic map: countries to datacenters, with a fallback datacenter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoMap {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_datacenter: Option<DatacenterBase>,
    #[serde(default)]
    pub assignments: Vec<GeoAssignment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadObject {
    #[serde(default)]
    pub load_object: String,
    #[serde(default)]
    pub load_object_port: i64,
    #[serde(default)]
    pub load_servers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInstance {
    pub datacenter_id: i64,
    #[serde(default)]
    pub use_default_load_object: bool,
    #[serde(flatten)]
    pub load_object: LoadObject,
}

/// Load feedback resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub host_header: String,
    #[serde(default)]
    pub least_squares_decay: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub leader_string: String,
    #[serde(default)]
    pub constrained_property: String,
    #[serde(default)]
    pub aggregation_type: String,
    #[serde(default)]
    pub load_imbalance_percentage: f64,
    #[serde(default)]
    pub upper_bound: i64,
    #[serde(default)]
    pub max_u_multiplicative_increment: f64,
    #[serde(default)]
    pub decay_rate: f64,
    #[serde(default)]
    pub resource_instances: Vec<ResourceInstance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetGeoMapRequest {
    pub domain_name: String,
    pub map_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateGeoMapRequest {
    pub domain_name: String,
    pub geo_map: GeoMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateGeoMapResponse {
    pub resource: GeoMap,
    pub status: ResponseStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGeoMapRequest {
    pub domain_name: String,
    pub geo_map: GeoMap,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteGeoMapRequest {
    pub domain_name: String,
    pub map_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetResourceRequest {
    pub domain_name: String,
    pub resource_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResourceRequest {
    pub domain_name: String,
    pub resource: Resource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateResourceResponse {
    pub resource: Resource,
    pub status: ResponseStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResourceRequest {
    pub domain_name: String,
    pub resource: Resource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteResourceRequest {
    pub domain_name: String,
    pub resource_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetDatacenterRequest {
    pub domain_name: String,
    pub datacenter_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateMapsDefaultDatacenterRequest {
    pub domain_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetDomainStatusRequest {
    pub domain_name: String,
}

/// Update and delete responses carry only the change status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusResponse {
    pub status: ResponseStatus,
}

/// Operations of the GTM configuration API used by the resources
#[async_trait]
pub trait Gtm: Send + Sync {
    async fn get_geo_map(&self, request: GetGeoMapRequest) -> ApiResult<GeoMap>;

    async fn create_geo_map(&self, request: CreateGeoMapRequest)
    -> ApiResult<CreateGeoMapResponse>;

    async fn update_geo_map(&self, request: UpdateGeoMapRequest) -> ApiResult<StatusResponse>;

    async fn delete_geo_map(&self, request: DeleteGeoMapRequest) -> ApiResult<StatusResponse>;

    async fn get_resource(&self, request: GetResourceRequest) -> ApiResult<Resource>;

    async fn create_resource(
        &self,
        request: CreateResourceRequest,
    ) -> ApiResult<CreateResourceResponse>;

    async fn update_resource(&self, request: UpdateResourceRequest) -> ApiResult<StatusResponse>;

    async fn delete_resource(&self, request: DeleteResourceRequest) -> ApiResult<StatusResponse>;

    async fn get_datacenter(&self, request: GetDatacenterRequest) -> ApiResult<Datacenter>;

    /// Create the reserved default datacenter used by geographic maps
    async fn create_maps_default_datacenter(
        &self,
        request: CreateMapsDefaultDatacenterRequest,
    ) -> ApiResult<Datacenter>;

    async fn get_domain_status(&self, request: GetDomainStatusRequest) -> ApiResult<ResponseStatus>;
}
