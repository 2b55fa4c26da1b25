//! State management for managed resources
//!
//! Manages the `.edgeplan/state.json` file which records the attributes of
//! every resource as of the last apply or refresh.

use crate::error::{CloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

const STATE_VERSION: u32 = 1;
pub const DEFAULT_STATE_DIR: &str = ".edgeplan";
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Global state containing all recorded resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// Format version of the file
    pub version: u32,

    pub updated_at: DateTime<Utc>,

    /// Recorded resources keyed by address
    pub resources: BTreeMap<String, ResourceState>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get resources of a specific type
    pub fn resources_of_type(&self, resource_type: &str) -> Vec<(&String, &ResourceState)> {
        self.resources
            .iter()
            .filter(|(_, r)| r.resource_type == resource_type)
            .collect()
    }

    /// Record `state` under `address`, replacing any previous entry
    pub fn set_resource(&mut self, address: String, state: ResourceState) {
        self.resources.insert(address, state);
        self.updated_at = Utc::now();
    }

    /// Forget the resource at `address`
    pub fn remove_resource(&mut self, address: &str) -> Option<ResourceState> {
        let result = self.resources.remove(address);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    /// Get a resource by address
    pub fn get_resource(&self, address: &str) -> Option<&ResourceState> {
        self.resources.get(address)
    }
}

/// Recorded state of a single resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Remote resource ID
    pub id: String,

    pub resource_type: String,

    /// Recorded attributes, keyed like the resource configuration
    pub attributes: Value,

    /// First time the resource was recorded
    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>, attributes: Value) -> Self {
        let now = Utc::now();
        let id = id.into();
        let mut attributes = attributes;
        if let Some(object) = attributes.as_object_mut() {
            object.insert("id".to_string(), Value::String(id.clone()));
        }
        Self {
            id,
            resource_type: resource_type.into(),
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Carry over the creation timestamp of the state this one replaces
    pub fn succeeding(mut self, previous: &ResourceState) -> Self {
        self.created_at = previous.created_at;
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        if let Some(object) = self.attributes.as_object_mut() {
            object.insert(key.into(), value);
            self.updated_at = Utc::now();
        }
    }

    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Reads and writes the state file of one project
#[derive(Debug, Clone)]
pub struct StateManager {
    dir: PathBuf,
}

impl StateManager {
    /// State kept in `.edgeplan/` below `project_root`
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::in_dir(project_root.as_ref().join(DEFAULT_STATE_DIR))
    }

    /// State kept directly in `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read the recorded state; a project without a state file has none recorded
    pub async fn load(&self) -> Result<GlobalState> {
        let content = match fs::read_to_string(self.file(STATE_FILE)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "no state recorded yet");
                return Ok(GlobalState::new());
            }
            Err(e) => return Err(e.into()),
        };

        let state: GlobalState = serde_json::from_str(&content)?;
        if state.version > STATE_VERSION {
            return Err(CloudError::StateError(format!(
                "state format {} is not supported (expected at most {})",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!(resources = state.resources.len(), "state loaded");
        Ok(state)
    }

    /// Write `state`, moving the file it replaces to the backup slot
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let current = self.file(STATE_FILE);
        if fs::try_exists(&current).await? {
            // rename overwrites an existing backup
            fs::rename(&current, self.file(STATE_BACKUP)).await?;
        }

        fs::write(&current, serde_json::to_vec_pretty(state)?).await?;
        tracing::debug!(resources = state.resources.len(), "state saved");
        Ok(())
    }

    /// Take the project lock; fails while another run holds a lock younger than an hour
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.file(LOCK_FILE);

        if let Ok(content) = fs::read_to_string(&path).await {
            match serde_json::from_str::<LockInfo>(&content) {
                Ok(held) if !held.is_stale() => {
                    return Err(CloudError::LockError(format!(
                        "state is locked by {} since {}",
                        held.holder, held.acquired_at
                    )));
                }
                Ok(held) => {
                    tracing::warn!(holder = %held.holder, "taking over stale state lock");
                }
                // An unreadable lock has no live holder to wait for
                Err(e) => tracing::warn!(error = %e, "replacing unreadable state lock"),
            }
        }

        fs::write(&path, serde_json::to_vec_pretty(&LockInfo::current())?).await?;
        tracing::debug!("state lock acquired");
        Ok(StateLock { path: Some(path) })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

impl LockInfo {
    fn current() -> Self {
        let holder = ["HOSTNAME", "HOST"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            holder,
            acquired_at: Utc::now(),
        }
    }

    fn is_stale(&self) -> bool {
        Utc::now().signed_duration_since(self.acquired_at) >= chrono::Duration::hours(1)
    }
}

/// Held project lock; dropping it removes the lock file
#[derive(Debug)]
pub struct StateLock {
    path: Option<PathBuf>,
}

impl StateLock {
    pub async fn release(mut self) -> Result<()> {
        if let Some(path) = self.path.take() {
            match fs::remove_file(&path).await {
                Ok(()) => tracing::debug!("state lock released"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
