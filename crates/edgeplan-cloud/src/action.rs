//! Planned actions and apply results

use crate::diff::AttributeChange;
use serde::{Deserialize, Serialize};

/// Represents a planned action for a managed resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// `<kind>-<address>`
    pub id: String,

    pub action_type: ActionType,

    /// Resource type (e.g., "gtm_geomap")
    pub resource_type: String,

    /// Resource address (`<type>.<name>`)
    pub address: String,

    /// Human readable line for plan output
    pub description: String,

    /// Attribute changes that motivated the action
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<AttributeChange>,
}

impl Action {
    pub fn new(action_type: ActionType, resource_type: &str, address: &str) -> Self {
        Self {
            id: format!("{}-{}", action_type, address),
            action_type,
            resource_type: resource_type.to_string(),
            address: address.to_string(),
            description: format!("{} {}", address, action_type.verb()),
            changes: Vec::new(),
        }
    }

    pub fn with_changes(mut self, changes: Vec<AttributeChange>) -> Self {
        self.changes = changes;
        self
    }
}

/// What the engine does with a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create the remote object
    Create,
    /// Update an existing resource in place
    Update,
    /// Delete and re-create a resource
    Replace,
    /// Delete the remote object
    Delete,
    /// Remote object already matches
    NoOp,
}

impl ActionType {
    fn verb(&self) -> &'static str {
        match self {
            ActionType::Create => "will be created",
            ActionType::Update => "will be updated in-place",
            ActionType::Replace => "must be replaced",
            ActionType::Delete => "will be destroyed",
            ActionType::NoOp => "is up to date",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ActionType::Create => "create",
            ActionType::Update => "update",
            ActionType::Replace => "replace",
            ActionType::Delete => "delete",
            ActionType::NoOp => "no-op",
        })
    }
}

/// Outcome of an apply run, split by success
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub succeeded: Vec<ActionResult>,
    pub failed: Vec<ActionResult>,
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action_id: String, message: String) {
        self.succeeded.push(ActionResult { action_id, message });
    }

    pub fn add_failure(&mut self, action_id: String, error: String) {
        self.failed.push(ActionResult {
            action_id,
            message: error,
        });
    }

    /// Error messages of all failed actions
    pub fn errors(&self) -> Vec<&str> {
        self.failed.iter().map(|r| r.message.as_str()).collect()
    }
}

/// One applied action; `message` holds the error when it sits in `failed`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: String,
    pub message: String,
}

/// Ordered actions produced by a plan run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
    /// True when any action is not a no-op
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    /// Find the action planned for a resource address
    pub fn action_for(&self, address: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.address == address)
    }

    pub fn summary(&self) -> PlanSummary {
        self.actions
            .iter()
            .fold(PlanSummary::default(), |mut summary, action| {
                let counter = match action.action_type {
                    ActionType::Create => &mut summary.create,
                    ActionType::Update => &mut summary.update,
                    ActionType::Replace => &mut summary.replace,
                    ActionType::Delete => &mut summary.delete,
                    ActionType::NoOp => &mut summary.no_change,
                };
                *counter += 1;
                summary
            })
    }
}

/// Per-kind action counts of a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub replace: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to replace, {} to delete, {} unchanged",
            self.create, self.update, self.replace, self.delete, self.no_change
        )
    }
}
