//! edgeplan GTM resources
//!
//! Global traffic management resources managed through the edgeplan engine:
//!
//! - `gtm_geomap`: maps countries to datacenters of a GTM domain
//! - `gtm_resource`: load feedback resource with per-datacenter instances
//!
//! Both resources talk to the API through the [`Gtm`] client trait. Countries,
//! assignments, resource instances and load servers are declared as sets in
//! the resource schemas, so their order never causes a plan change.

pub mod client;
mod config;
pub mod error;
pub mod geomap;
pub mod mock;
pub mod resource;
pub mod status;

// Re-exports
pub use client::Gtm;
pub use error::{GtmError, Operation, Result};
pub use geomap::{GEOMAP_TYPE, GeoMapResource, MAPS_DEFAULT_DATACENTER_ID, geomap_schema};
pub use mock::MockGtm;
pub use resource::{GtmResource, RESOURCE_TYPE, resource_schema};
pub use status::StatusPoll;
