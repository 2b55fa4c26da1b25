//! Managed resource trait definition

use crate::error::Result;
use crate::schema::ResourceSchema;
use crate::state::ResourceState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of one kind of remote resource
///
/// Every resource kind (GTM geo maps, bot manager rule sequences, ...)
/// implements this trait so the engine can plan and apply it uniformly.
/// Attributes travel as JSON objects keyed by snake_case attribute name.
#[async_trait]
pub trait ManagedResource: Send + Sync {
    /// Resource type name (e.g., "gtm_geomap")
    fn type_name(&self) -> &'static str;

    /// Attribute schema used for planning
    fn schema(&self) -> &ResourceSchema;

    /// Create the resource and return its recorded state
    async fn create(&self, config: &serde_json::Value) -> Result<ResourceState>;

    /// Re-read the resource; `None` when it no longer exists remotely
    async fn read(&self, state: &ResourceState) -> Result<Option<ResourceState>>;

    /// Update the resource in place
    async fn update(
        &self,
        config: &serde_json::Value,
        state: &ResourceState,
    ) -> Result<ResourceState>;

    /// Delete the resource
    async fn delete(&self, state: &ResourceState) -> Result<()>;

    /// Import an existing resource by its import ID
    async fn import(&self, import_id: &str) -> Result<ResourceState>;
}

/// Set of resources to be managed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Resources indexed by address
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.address(), resource);
    }

    pub fn with(mut self, resource: ResourceConfig) -> Self {
        self.add(resource);
        self
    }

    pub fn get(&self, address: &str) -> Option<&ResourceConfig> {
        self.resources.get(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }
}

/// Desired configuration of a managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "gtm_geomap")
    pub resource_type: String,

    /// Local name of the resource
    pub name: String,

    /// Resource-specific attributes
    pub config: serde_json::Value,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            config,
        }
    }

    /// Get the resource address (type.name)
    pub fn address(&self) -> String {
        address(&self.resource_type, &self.name)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Build a resource address
pub fn address(resource_type: &str, name: &str) -> String {
    format!("{}.{}", resource_type, name)
}

/// Split a composite import ID made of exactly `parts` non-empty pieces
pub fn split_import_id(import_id: &str, parts: usize) -> Option<Vec<&str>> {
    let pieces: Vec<&str> = import_id.split(':').collect();
    if pieces.len() != parts || pieces.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(pieces)
}
