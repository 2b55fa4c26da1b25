//! Tracing subscriber setup

use edgeplan_config::Settings;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

pub const LOG_LEVEL_ENV: &str = "EDGEPLAN_LOG";
pub const LOG_FILE_ENV: &str = "EDGEPLAN_LOG_FILE";

const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Level from `EDGEPLAN_LOG`, then the settings, then `warn`.
/// An unparsable level is returned as the second element.
fn resolve_level(settings: &Settings) -> (LevelFilter, Option<String>) {
    let requested = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| settings.log_level.clone());

    match requested {
        None => (DEFAULT_LEVEL, None),
        Some(level) => match LevelFilter::from_str(&level) {
            Ok(filter) => (filter, None),
            Err(_) => (DEFAULT_LEVEL, Some(level)),
        },
    }
}

fn resolve_log_file(settings: &Settings) -> Option<PathBuf> {
    std::env::var(LOG_FILE_ENV)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| settings.log_file.clone())
}

/// Install the global subscriber. Logs go to the configured file (appended,
/// no ANSI colors) or to stderr.
pub fn init_logging(settings: &Settings) -> anyhow::Result<()> {
    let (level, invalid) = resolve_level(settings);
    let filter = EnvFilter::default().add_directive(level.into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match resolve_log_file(settings) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            builder
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;
        }
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;
        }
    }

    if let Some(invalid) = invalid {
        tracing::warn!("unknown log level {:?}, using {}", invalid, DEFAULT_LEVEL);
    }
    Ok(())
}

/// Emit `text` one event per line so multi-line payloads stay readable in
/// line-oriented log files
pub fn log_multiline(level: Level, prefix: &str, text: &str) {
    for line in text.lines() {
        match level {
            Level::ERROR => tracing::error!("{}{}", prefix, line),
            Level::WARN => tracing::warn!("{}{}", prefix, line),
            Level::INFO => tracing::info!("{}{}", prefix, line),
            Level::DEBUG => tracing::debug!("{}{}", prefix, line),
            Level::TRACE => tracing::trace!("{}{}", prefix, line),
        }
    }
}
