//! Install/config discovery.
//!
//! Resolves the replay folder of the most recently used game config directory
//! (creating whatever is missing), and separately looks for the game binary.
//!
//! Layout on disk:
//! `<user-data-root>/Warzone 2100 Project/<Warzone 2100 ...>/replay/multiplay/`

mod executable;
mod manifest;
mod steam;

pub use executable::{steam_relative_path, ExecutableSearch, EXECUTABLE_NAME, INSTALL_DIR_NAME};
pub use manifest::library_roots_from_manifest;
pub use steam::{
    steam_libraries, steam_path_from_reg_output, FixedProbe, HomeDirProbe, Probe, RegistryProbe,
    SteamRootProbe,
};

use anyhow::Context;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{HandlerError, HandlerResult};
use crate::logging::LogSink;

/// Folder names the game uses under the user-data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    /// Vendor folder directly under the user-data root.
    pub vendor_dir: String,
    /// Config directories start with this (case-insensitive).
    pub product_prefix: String,
    /// Created when no config directory exists yet.
    pub default_dir: String,
    /// Relative path of the replay folder inside a config directory.
    pub replay_subdir: PathBuf,
}

impl Default for InstallLayout {
    fn default() -> Self {
        Self {
            vendor_dir: "Warzone 2100 Project".to_string(),
            product_prefix: "Warzone 2100".to_string(),
            default_dir: "Warzone 2100".to_string(),
            replay_subdir: Path::new("replay").join("multiplay"),
        }
    }
}

/// A versioned config directory and its last-modified time (`None` if unreadable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirectory {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
}

/// Reads the platform's user-data root from the process environment.
pub fn user_data_root() -> HandlerResult<PathBuf> {
    user_data_root_from(|key| std::env::var_os(key))
}

/// Like [`user_data_root`] with an injectable environment lookup.
///
/// Windows: `APPDATA`. Elsewhere: `XDG_DATA_HOME`, else `$HOME/.local/share`.
///
/// The non-Windows root only mirrors the Windows layout. Linux builds of the
/// game keep their config elsewhere and will not see replays placed here
/// unless pointed at the folder.
pub fn user_data_root_from<F>(env: F) -> HandlerResult<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());

    if cfg!(windows) {
        return non_empty("APPDATA").map(PathBuf::from).ok_or_else(|| {
            HandlerError::Environment("APPDATA env var not found. Are you on Windows?".to_string())
        });
    }

    if let Some(data) = non_empty("XDG_DATA_HOME") {
        return Ok(PathBuf::from(data));
    }
    non_empty("HOME")
        .map(|home| PathBuf::from(home).join(".local").join("share"))
        .ok_or_else(|| {
            HandlerError::Environment("neither XDG_DATA_HOME nor HOME is set".to_string())
        })
}

/// Candidate config directories under `root`, most recently modified first.
///
/// Creates the vendor folder, and a default config directory when none exists.
pub fn find_config_dirs(
    root: &Path,
    layout: &InstallLayout,
    log: &dyn LogSink,
) -> HandlerResult<Vec<ConfigDirectory>> {
    let base = root.join(&layout.vendor_dir);
    if !base.is_dir() {
        fs::create_dir_all(&base)
            .with_context(|| format!("create {}", base.display()))
            .map_err(HandlerError::Filesystem)?;
    }

    let prefix = layout.product_prefix.to_lowercase();
    let mut names: Vec<OsString> = Vec::new();
    let entries = fs::read_dir(&base)
        .with_context(|| format!("list {}", base.display()))
        .map_err(HandlerError::Filesystem)?;
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log.warn(&format!("Skipping unreadable entry in {}: {}", base.display(), e));
                continue;
            }
        };
        let name = entry.file_name();
        if entry.path().is_dir() && name.to_string_lossy().to_lowercase().starts_with(&prefix) {
            names.push(name);
        }
    }
    // Discovery order is name order, so ties rank the same way on every run.
    names.sort();

    if names.is_empty() {
        let default_dir = base.join(&layout.default_dir);
        fs::create_dir_all(&default_dir)
            .with_context(|| format!("create {}", default_dir.display()))
            .map_err(HandlerError::Filesystem)?;
        log.info(&format!("No config dir found, created {}", default_dir.display()));
        names.push(OsString::from(&layout.default_dir));
    }

    let candidates = names
        .into_iter()
        .map(|name| {
            let path = base.join(name);
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
            ConfigDirectory { path, modified }
        })
        .collect();
    Ok(rank_by_recency(candidates))
}

/// Stable sort by modification time, newest first; unknown times go last.
pub fn rank_by_recency(mut candidates: Vec<ConfigDirectory>) -> Vec<ConfigDirectory> {
    candidates.sort_by(|a, b| b.modified.cmp(&a.modified));
    candidates
}

/// Picks the most recently used config directory and ensures its replay folder exists.
/// Returns the selected config directory and the replay folder path.
pub fn resolve_replay_dir(
    root: &Path,
    layout: &InstallLayout,
    log: &dyn LogSink,
) -> HandlerResult<(ConfigDirectory, PathBuf)> {
    let selected = find_config_dirs(root, layout, log)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            HandlerError::Filesystem(anyhow::anyhow!("no config directory under {}", root.display()))
        })?;
    log.info(&format!("Using config dir: {}", selected.path.display()));

    let target = selected.path.join(&layout.replay_subdir);
    fs::create_dir_all(&target)
        .with_context(|| format!("create {}", target.display()))
        .map_err(HandlerError::Filesystem)?;
    Ok((selected, target))
}
