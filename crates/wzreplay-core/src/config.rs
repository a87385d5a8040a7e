use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::url_model::{AllowPolicy, ALLOWED_HOSTS, ALLOWED_SCHEME, REPLAY_EXTENSION};

/// Allow-list section (`[policy]`). An empty host list rejects every URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub scheme: String,
    /// Required path suffix, including the dot.
    pub extension: String,
    /// Accepted hosts (`host` or `host:port`), compared lower-cased.
    pub allowed_hosts: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            scheme: ALLOWED_SCHEME.to_string(),
            extension: REPLAY_EXTENSION.to_string(),
            allowed_hosts: ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl PolicyConfig {
    pub fn to_policy(&self) -> AllowPolicy {
        AllowPolicy::new(&self.scheme, &self.extension, self.allowed_hosts.as_slice())
    }
}

/// Transfer limits (`[download]`). No retries: one attempt per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Upper bound on the whole request, body included.
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            connect_timeout_secs: 30,
        }
    }
}

impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Launch section (`[launch]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Steam app id used by the degraded `steam://rungameid/<id>` launch.
    pub steam_app_id: String,
    /// Open the diagnostic log in the default viewer when the invocation fails.
    pub open_log_on_error: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            steam_app_id: "1241950".to_string(),
            open_log_on_error: true,
        }
    }
}

/// Handler configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    pub policy: PolicyConfig,
    pub download: DownloadConfig,
    pub launch: LaunchConfig,
}

#[cfg(unix)]
pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wzreplay")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

#[cfg(not(unix))]
pub fn config_path() -> Result<PathBuf> {
    let appdata = std::env::var_os("APPDATA").context("APPDATA env var not found")?;
    Ok(PathBuf::from(appdata).join("wzreplay").join("config.toml"))
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from(path: &Path) -> Result<HandlerConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: HandlerConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Load the per-user configuration, creating a default file if none exists.
///
/// Only a present but unreadable or malformed file is an error. If the config
/// location cannot be determined or the default cannot be written, the
/// defaults are used and a warning is logged.
pub fn load_or_init() -> Result<HandlerConfig> {
    match config_path() {
        Ok(path) => load_or_init_at(&path),
        Err(e) => {
            tracing::warn!("no per-user config location, using defaults: {:#}", e);
            Ok(HandlerConfig::default())
        }
    }
}

/// [`load_or_init`] for an explicit location.
pub fn load_or_init_at(path: &Path) -> Result<HandlerConfig> {
    if path.exists() {
        return load_from(path);
    }

    let default_cfg = HandlerConfig::default();
    match write_default(path, &default_cfg) {
        Ok(()) => tracing::info!("created default config at {}", path.display()),
        Err(e) => tracing::warn!("could not create {}, using defaults: {:#}", path.display(), e),
    }
    Ok(default_cfg)
}

fn write_default(path: &Path, cfg: &HandlerConfig) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
