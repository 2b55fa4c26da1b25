pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "EDGEPLAN_CONFIG_PATH";
pub const SETTINGS_FILE: &str = "edgeplan.yaml";

/// Settings loaded from `edgeplan.yaml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level filter (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: Option<String>,

    /// Append logs to this file instead of stderr
    pub log_file: Option<PathBuf>,

    /// Directory holding the state file, relative to the project root
    pub state_dir: Option<PathBuf>,
}

/// edgeplan's global configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("edgeplan"))
}

/// Find the settings file
///
/// Search order:
/// 1. `EDGEPLAN_CONFIG_PATH` (direct path)
/// 2. `./edgeplan.yaml`
/// 3. `./.edgeplan/edgeplan.yaml`
/// 4. `<config dir>/edgeplan/edgeplan.yaml`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        tracing::warn!("{} points to a missing file: {}", CONFIG_PATH_ENV, path.display());
    }

    let current_dir = std::env::current_dir()?;
    let local = [
        current_dir.join(SETTINGS_FILE),
        current_dir.join(".edgeplan").join(SETTINGS_FILE),
    ];
    if let Some(path) = local.into_iter().find(|p| p.exists()) {
        return Ok(Some(path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("edgeplan").join(SETTINGS_FILE);
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Parse a settings file
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the settings file found by [`find_config_file`], or defaults when there is none
pub fn load() -> Result<Settings> {
    match find_config_file()? {
        Some(path) => {
            tracing::debug!("loading settings from {}", path.display());
            load_from(&path)
        }
        None => Ok(Settings::default()),
    }
}
