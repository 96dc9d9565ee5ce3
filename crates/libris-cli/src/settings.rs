//! Settings file and platform paths.
//!
//! Settings live in `settings.toml` under the platform config directory;
//! the access token is stored next to it in `session.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use libris_client::{API_HOST_ENV, ClientConfig, DEFAULT_API_HOST, DEFAULT_TIMEOUT_SECS, TIMEOUT_ENV};
use libris_state::{CoordinatorConfig, DEFAULT_DEBOUNCE};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.toml";
const TOKEN_FILE: &str = "session.toml";

/// Books per page when the settings file says nothing.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_host: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    /// Search debounce in milliseconds.
    pub debounce_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: u64::try_from(DEFAULT_DEBOUNCE.as_millis()).unwrap_or(300),
        }
    }
}

impl Settings {
    /// Layer the environment and then an explicit `--api-host` over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LIBRIS_TIMEOUT_SECS` is not a whole number.
    pub fn with_overrides(self, api_host: Option<&str>) -> Result<Self> {
        let mut settings = self.with_env(|key| std::env::var(key).ok())?;
        if let Some(host) = api_host {
            settings.api_host = host.to_string();
        }
        Ok(settings)
    }

    /// Apply [`API_HOST_ENV`] and [`TIMEOUT_ENV`] as read through `lookup`.
    fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(host) = lookup(API_HOST_ENV)
            && !host.trim().is_empty()
        {
            self.api_host = host;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.timeout_secs = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{TIMEOUT_ENV} must be a number of seconds, got {raw:?}"))?;
        }
        Ok(self)
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let config =
            ClientConfig::new(&self.api_host).with_timeout(Duration::from_secs(self.timeout_secs));
        config
            .validate()
            .with_context(|| format!("invalid settings for {}", self.api_host))?;
        Ok(config)
    }

    #[must_use]
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::default().with_debounce(Duration::from_millis(self.debounce_ms))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "libris", "Libris")
}

/// Path to `settings.toml`, if the platform has a config directory.
pub fn settings_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Path to the persisted session token.
pub fn token_path() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(TOKEN_FILE))
        .context("no config directory available for this user")
}

pub fn load_settings() -> Settings {
    match settings_path() {
        Some(path) => load_settings_from(&path),
        None => Settings::default(),
    }
}

/// Read settings from `path`, falling back to defaults when it is missing
/// or unreadable.
pub fn load_settings_from(path: &Path) -> Settings {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read settings");
            return Settings::default();
        }
    };
    match toml::from_str(&contents) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to parse settings");
            Settings::default()
        }
    }
}

/// Write `settings` to `path`, creating the directory if needed.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(settings).context("serialize settings")?;
    std::fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
