//! Plan/apply engine
//!
//! Reconciles a desired [`ResourceSet`] against recorded state: refresh every
//! recorded resource from the remote side, diff it with its configuration
//! using the resource schema, then create, update, replace or delete.

use crate::action::{Action, ActionType, ApplyResult, Plan};
use crate::diff::{diff, requires_replace};
use crate::error::{CloudError, Result};
use crate::provider::{address, ManagedResource, ResourceConfig, ResourceSet};
use crate::state::{GlobalState, ResourceState, StateManager};
use std::collections::HashMap;
use std::sync::Arc;

pub struct Engine {
    resources: HashMap<&'static str, Arc<dyn ManagedResource>>,
    state: StateManager,
}

impl Engine {
    pub fn new(state: StateManager) -> Self {
        Self {
            resources: HashMap::new(),
            state,
        }
    }

    /// Register a resource kind
    pub fn register(mut self, resource: Arc<dyn ManagedResource>) -> Self {
        self.resources.insert(resource.type_name(), resource);
        self
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.state
    }

    fn resource(&self, resource_type: &str) -> Result<&Arc<dyn ManagedResource>> {
        self.resources
            .get(resource_type)
            .ok_or_else(|| CloudError::UnknownResourceType(resource_type.to_string()))
    }

    /// Re-read every recorded resource, dropping the ones gone remotely
    async fn refresh_state(&self, state: &mut GlobalState) -> Result<()> {
        let recorded: Vec<(String, ResourceState)> = state
            .resources
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (addr, current) in recorded {
            let resource = self.resource(&current.resource_type)?;
            match resource.read(&current).await? {
                Some(fresh) => state.set_resource(addr, fresh.succeeding(&current)),
                None => {
                    tracing::warn!("{} was removed outside of edgeplan", addr);
                    state.remove_resource(&addr);
                }
            }
        }
        Ok(())
    }

    /// Refresh recorded state and persist it
    pub async fn refresh(&self) -> Result<GlobalState> {
        let lock = self.state.acquire_lock().await?;
        let mut state = self.state.load().await?;
        self.refresh_state(&mut state).await?;
        self.state.save(&state).await?;
        lock.release().await?;
        Ok(state)
    }

    fn plan_against(&self, state: &GlobalState, desired: &ResourceSet) -> Result<Plan> {
        let mut actions = Vec::new();

        for config in desired.iter() {
            let resource = self.resource(&config.resource_type)?;
            let addr = config.address();

            if let Some(name) = resource.schema().missing_required(&config.config) {
                tracing::debug!("{} is missing {}", addr, name);
                return Err(CloudError::MissingRequiredArgument(name.to_string()));
            }

            let action = match state.get_resource(&addr) {
                None => Action::new(ActionType::Create, &config.resource_type, &addr),
                Some(current) => {
                    let changes = diff(resource.schema(), &config.config, &current.attributes);
                    let action_type = if changes.is_empty() {
                        ActionType::NoOp
                    } else if requires_replace(&changes) {
                        ActionType::Replace
                    } else {
                        ActionType::Update
                    };
                    Action::new(action_type, &config.resource_type, &addr).with_changes(changes)
                }
            };
            actions.push(action);
        }

        for (addr, current) in &state.resources {
            if desired.get(addr).is_none() {
                actions.push(Action::new(
                    ActionType::Delete,
                    &current.resource_type,
                    addr,
                ));
            }
        }

        Ok(Plan::new(actions))
    }

    /// Compute the actions needed to reach `desired`. Recorded state is
    /// refreshed in memory only.
    pub async fn plan(&self, desired: &ResourceSet) -> Result<Plan> {
        let mut state = self.state.load().await?;
        self.refresh_state(&mut state).await?;
        let plan = self.plan_against(&state, desired)?;
        tracing::info!("Plan: {}", plan.summary());
        Ok(plan)
    }

    /// Apply the plan for `desired` and record the resulting state
    pub async fn apply(&self, desired: &ResourceSet) -> Result<ApplyResult> {
        let start = std::time::Instant::now();
        let lock = self.state.acquire_lock().await?;

        let mut state = self.state.load().await?;
        self.refresh_state(&mut state).await?;
        let plan = self.plan_against(&state, desired)?;

        let mut result = ApplyResult::new();
        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }
            match self
                .apply_action(action, desired.get(&action.address), &mut state)
                .await
            {
                Ok(()) => result.add_success(action.id.clone(), action.description.clone()),
                Err(e) => {
                    tracing::error!("{} failed: {}", action.id, e);
                    result.add_failure(action.id.clone(), e.to_string());
                }
            }
        }

        self.state.save(&state).await?;
        lock.release().await?;

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn apply_action(
        &self,
        action: &Action,
        config: Option<&ResourceConfig>,
        state: &mut GlobalState,
    ) -> Result<()> {
        let resource = self.resource(&action.resource_type)?;
        let addr = &action.address;
        let missing_config = || CloudError::ResourceNotFound(addr.clone());
        let missing_state = || CloudError::StateError(format!("no recorded state for {}", addr));

        match action.action_type {
            ActionType::Create => {
                let config = config.ok_or_else(missing_config)?;
                tracing::info!("Creating {}", addr);
                let created = resource.create(&config.config).await?;
                state.set_resource(addr.clone(), created);
            }
            ActionType::Update => {
                let config = config.ok_or_else(missing_config)?;
                let current = state.get_resource(addr).cloned().ok_or_else(missing_state)?;
                tracing::info!("Updating {}", addr);
                let updated = resource.update(&config.config, &current).await?;
                state.set_resource(addr.clone(), updated.succeeding(&current));
            }
            ActionType::Replace => {
                let config = config.ok_or_else(missing_config)?;
                let current = state.get_resource(addr).cloned().ok_or_else(missing_state)?;
                tracing::info!("Replacing {}", addr);
                resource.delete(&current).await?;
                state.remove_resource(addr);
                let created = resource.create(&config.config).await?;
                state.set_resource(addr.clone(), created);
            }
            ActionType::Delete => {
                let current = state.get_resource(addr).cloned().ok_or_else(missing_state)?;
                tracing::info!("Deleting {}", addr);
                resource.delete(&current).await?;
                state.remove_resource(addr);
            }
            ActionType::NoOp => {}
        }
        Ok(())
    }

    /// Delete every recorded resource
    pub async fn destroy(&self) -> Result<ApplyResult> {
        self.apply(&ResourceSet::new()).await
    }

    /// Import an existing remote resource under `<resource_type>.<name>`
    pub async fn import(
        &self,
        resource_type: &str,
        name: &str,
        import_id: &str,
    ) -> Result<ResourceState> {
        let resource = self.resource(resource_type)?;
        let addr = address(resource_type, name);

        let lock = self.state.acquire_lock().await?;
        let mut state = self.state.load().await?;
        if state.get_resource(&addr).is_some() {
            return Err(CloudError::ResourceAlreadyExists(addr));
        }

        tracing::info!("Importing {} from {}", addr, import_id);
        let imported = resource.import(import_id).await?;
        state.set_resource(addr, imported.clone());
        self.state.save(&state).await?;
        lock.release().await?;

        Ok(imported)
    }
}
