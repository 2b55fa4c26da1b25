//! In-memory [`Gtm`] client driven by call expectations

use crate::client::*;
use async_trait::async_trait;
use edgeplan_cloud::mock::{MockCalls, assert_no_problems};

/// Mock GTM client.
///
/// Each operation is a public [`MockCalls`]; register expectations on it
/// directly, e.g. `mock.get_geo_map.expect(Some(req), Err(ApiError::not_found())).once()`.
pub struct MockGtm {
    pub get_geo_map: MockCalls<GetGeoMapRequest, GeoMap>,
    pub create_geo_map: MockCalls<CreateGeoMapRequest, CreateGeoMapResponse>,
    pub update_geo_map: MockCalls<UpdateGeoMapRequest, StatusResponse>,
    pub delete_geo_map: MockCalls<DeleteGeoMapRequest, StatusResponse>,
    pub get_resource: MockCalls<GetResourceRequest, Resource>,
    pub create_resource: MockCalls<CreateResourceRequest, CreateResourceResponse>,
    pub update_resource: MockCalls<UpdateResourceRequest, StatusResponse>,
    pub delete_resource: MockCalls<DeleteResourceRequest, StatusResponse>,
    pub get_datacenter: MockCalls<GetDatacenterRequest, Datacenter>,
    pub create_maps_default_datacenter: MockCalls<CreateMapsDefaultDatacenterRequest, Datacenter>,
    pub get_domain_status: MockCalls<GetDomainStatusRequest, ResponseStatus>,
}

impl Default for MockGtm {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGtm {
    pub fn new() -> Self {
        Self {
            get_geo_map: MockCalls::new("GetGeoMap"),
            create_geo_map: MockCalls::new("CreateGeoMap"),
            update_geo_map: MockCalls::new("UpdateGeoMap"),
            delete_geo_map: MockCalls::new("DeleteGeoMap"),
            get_resource: MockCalls::new("GetResource"),
            create_resource: MockCalls::new("CreateResource"),
            update_resource: MockCalls::new("UpdateResource"),
            delete_resource: MockCalls::new("DeleteResource"),
            get_datacenter: MockCalls::new("GetDatacenter"),
            create_maps_default_datacenter: MockCalls::new("CreateMapsDefaultDatacenter"),
            get_domain_status: MockCalls::new("GetDomainStatus"),
        }
    }

    /// Every unmet expectation and unexpected call
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        problems.extend(self.get_geo_map.problems());
        problems.extend(self.create_geo_map.problems());
        problems.extend(self.update_geo_map.problems());
        problems.extend(self.delete_geo_map.problems());
        problems.extend(self.get_resource.problems());
        problems.extend(self.create_resource.problems());
        problems.extend(self.update_resource.problems());
        problems.extend(self.delete_resource.problems());
        problems.extend(self.get_datacenter.problems());
        problems.extend(self.create_maps_default_datacenter.problems());
        problems.extend(self.get_domain_status.problems());
        problems
    }

    pub fn assert_expectations(&self) {
        assert_no_problems(self.problems());
    }
}

#[async_trait]
impl Gtm for MockGtm {
    async fn get_geo_map(&self, request: GetGeoMapRequest) -> ApiResult<GeoMap> {
        self.get_geo_map.call(request)
    }

    async fn create_geo_map(
        &self,
        request: CreateGeoMapRequest,
    ) -> ApiResult<CreateGeoMapResponse> {
        self.create_geo_map.call(request)
    }

    async fn update_geo_map(&self, request: UpdateGeoMapRequest) -> ApiResult<StatusResponse> {
        self.update_geo_map.call(request)
    }

    async fn delete_geo_map(&self, request: DeleteGeoMapRequest) -> ApiResult<StatusResponse> {
        self.delete_geo_map.call(request)
    }

    async fn get_resource(&self, request: GetResourceRequest) -> ApiResult<Resource> {
        self.get_resource.call(request)
    }

    async fn create_resource(
        &self,
        request: CreateResourceRequest,
    ) -> ApiResult<CreateResourceResponse> {
        self.create_resource.call(request)
    }

    async fn update_resource(&self, request: UpdateResourceRequest) -> ApiResult<StatusResponse> {
        self.update_resource.call(request)
    }

    async fn delete_resource(&self, request: DeleteResourceRequest) -> ApiResult<StatusResponse> {
        self.delete_resource.call(request)
    }

    async fn get_datacenter(&self, request: GetDatacenterRequest) -> ApiResult<Datacenter> {
        self.get_datacenter.call(request)
    }

    async fn create_maps_default_datacenter(
        &self,
        request: CreateMapsDefaultDatacenterRequest,
    ) -> ApiResult<Datacenter> {
        self.create_maps_default_datacenter.call(request)
    }

    async fn get_domain_status(&self, request: GetDomainStatusRequest) -> ApiResult<ResponseStatus> {
        self.get_domain_status.call(request)
    }
}
