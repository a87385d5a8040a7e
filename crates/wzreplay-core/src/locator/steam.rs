//! Best-effort discovery of the Steam install root and its library folders.
//!
//! Nothing here fails: every lookup resolves to a [`Probe`], and "Steam is not
//! there" is an ordinary answer.

use regex::Regex;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::manifest::library_roots_from_manifest;
use crate::logging::LogSink;

/// Outcome of a best-effort external lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    /// The lookup ran and the thing is not there.
    Absent,
    /// The lookup itself could not run (tool missing, env unset, ...).
    Unavailable(String),
}

/// Source of the Steam install root.
pub trait SteamRootProbe {
    fn steam_root(&self) -> Probe<PathBuf>;
}

/// Windows: `reg query HKCU\Software\Valve\Steam /v SteamPath`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryProbe;

const STEAM_KEY: &str = r"HKCU\Software\Valve\Steam";

impl SteamRootProbe for RegistryProbe {
    fn steam_root(&self) -> Probe<PathBuf> {
        let output = match Command::new("reg")
            .args(["query", STEAM_KEY, "/v", "SteamPath"])
            .output()
        {
            Ok(o) => o,
            Err(e) => return Probe::Unavailable(format!("reg query: {}", e)),
        };
        if !output.status.success() {
            return Probe::Absent;
        }
        let text = String::from_utf8_lossy(&output.stdout);
        match steam_path_from_reg_output(&text) {
            Some(p) => Probe::Found(p),
            None => Probe::Absent,
        }
    }
}

/// Pulls the `SteamPath` value out of `reg query` output.
pub fn steam_path_from_reg_output(text: &str) -> Option<PathBuf> {
    let re = Regex::new(r"SteamPath\s+REG_SZ\s+(.+)").ok()?;
    let caps = re.captures(text)?;
    let value = caps[1].trim();
    if value.is_empty() {
        return None;
    }
    Some(PathBuf::from(value))
}

/// Unix: `~/.local/share/Steam` or the legacy `~/.steam/steam`.
#[derive(Debug, Clone, Default)]
pub struct HomeDirProbe {
    home: Option<OsString>,
}

impl HomeDirProbe {
    pub fn from_env() -> Self {
        Self {
            home: std::env::var_os("HOME"),
        }
    }

    pub fn with_home(home: impl Into<OsString>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }
}

impl SteamRootProbe for HomeDirProbe {
    fn steam_root(&self) -> Probe<PathBuf> {
        let Some(home) = self.home.as_ref().filter(|h| !h.is_empty()) else {
            return Probe::Unavailable("HOME is not set".to_string());
        };
        let home = PathBuf::from(home);
        [
            home.join(".local").join("share").join("Steam"),
            home.join(".steam").join("steam"),
        ]
        .into_iter()
        .find(|p| p.is_dir())
        .map_or(Probe::Absent, Probe::Found)
    }
}

/// Probe that always answers with a fixed value. Useful where Steam should be
/// ignored or pinned to a known directory.
#[derive(Debug, Clone)]
pub struct FixedProbe(pub Probe<PathBuf>);

impl SteamRootProbe for FixedProbe {
    fn steam_root(&self) -> Probe<PathBuf> {
        self.0.clone()
    }
}

/// The Steam root itself followed by every library listed in
/// `steamapps/libraryfolders.vdf`. A missing or unreadable manifest is logged
/// and leaves only the root.
pub fn steam_libraries(steam_root: &Path, log: &dyn LogSink) -> Vec<PathBuf> {
    let mut libraries = vec![steam_root.to_path_buf()];
    let manifest = steam_root.join("steamapps").join("libraryfolders.vdf");
    match fs::read(&manifest) {
        Ok(bytes) => {
            for root in library_roots_from_manifest(&String::from_utf8_lossy(&bytes)) {
                if !libraries.contains(&root) {
                    libraries.push(root);
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log.warn(&format!("Could not read {}: {}", manifest.display(), e)),
    }
    libraries
}
