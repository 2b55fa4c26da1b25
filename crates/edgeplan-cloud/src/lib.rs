//! edgeplan Cloud Infrastructure
//!
//! This crate provides the managed-resource abstraction shared by every
//! edgeplan product crate: declarative desired state, plan/diff against the
//! recorded state and the apply loop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 edgeplan-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  trait ManagedResource { create, read,   │   │
//! │  │        update, delete, import }          │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐ ┌────────────┐ ┌───────────┐  │
//! │  │ Schema+Diff  │ │   Engine   │ │ State Mgmt│  │
//! │  └──────────────┘ └────────────┘ └───────────┘  │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │      gtm      │ │    botman     │
//! │   resources   │ │   resources   │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! Ordering-insensitive planning is driven by the schema: attributes declared
//! as [`AttributeKind::Set`] are normalized before comparison, so reordering
//! them never produces a change.

pub mod action;
pub mod diff;
pub mod engine;
pub mod error;
pub mod mock;
pub mod provider;
pub mod schema;
pub mod state;

// Re-exports
pub use action::{Action, ActionType, ApplyResult, Plan, PlanSummary};
pub use diff::{AttributeChange, diff};
pub use engine::Engine;
pub use error::{ApiError, CloudError, Result};
pub use provider::{ManagedResource, ResourceConfig, ResourceSet, split_import_id};
pub use schema::{Attribute, AttributeKind, ResourceSchema};
pub use state::{GlobalState, ResourceState, StateLock, StateManager};
