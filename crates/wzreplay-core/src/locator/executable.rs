//! Companion executable discovery: standard install dirs, then Steam libraries.

use std::path::{Path, PathBuf};

use super::steam::{steam_libraries, Probe, SteamRootProbe};
#[cfg(not(windows))]
use super::steam::HomeDirProbe;
#[cfg(windows)]
use super::steam::RegistryProbe;
use crate::logging::LogSink;

#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "warzone2100.exe";
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "warzone2100";

/// Install folder name shared by standalone and Steam installs.
pub const INSTALL_DIR_NAME: &str = "Warzone 2100";

/// Where to look for the game binary. "Not found" is a normal answer.
pub struct ExecutableSearch {
    standard: Vec<PathBuf>,
    steam: Box<dyn SteamRootProbe>,
    /// Path of the binary relative to a Steam library root.
    steam_relative: PathBuf,
}

impl ExecutableSearch {
    pub fn new(
        standard: Vec<PathBuf>,
        steam: Box<dyn SteamRootProbe>,
        steam_relative: PathBuf,
    ) -> Self {
        Self {
            standard,
            steam,
            steam_relative,
        }
    }

    /// Standard locations and Steam probe for the current platform.
    pub fn platform_default() -> Self {
        Self::new(
            standard_locations(),
            default_steam_probe(),
            steam_relative_path(),
        )
    }

    pub fn standard_locations(&self) -> &[PathBuf] {
        &self.standard
    }

    /// First existing binary, or `None`.
    pub fn find(&self, log: &dyn LogSink) -> Option<PathBuf> {
        if let Some(p) = self.standard.iter().find(|p| p.is_file()) {
            return Some(p.clone());
        }

        let steam_root = match self.steam.steam_root() {
            Probe::Found(root) => root,
            Probe::Absent => {
                log.info("Steam install not detected");
                return None;
            }
            Probe::Unavailable(reason) => {
                log.warn(&format!("Steam lookup unavailable: {}", reason));
                return None;
            }
        };
        log.info(&format!("Steam root: {}", steam_root.display()));

        steam_libraries(&steam_root, log)
            .into_iter()
            .map(|lib| lib.join(&self.steam_relative))
            .find(|candidate| candidate.is_file())
    }
}

/// `steamapps/common/Warzone 2100/<binary>`.
pub fn steam_relative_path() -> PathBuf {
    Path::new("steamapps")
        .join("common")
        .join(INSTALL_DIR_NAME)
        .join(EXECUTABLE_NAME)
}

#[cfg(windows)]
fn standard_locations() -> Vec<PathBuf> {
    let pf = std::env::var_os("ProgramFiles")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files"));
    let pfx86 = std::env::var_os("ProgramFiles(x86)")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(r"C:\Program Files (x86)"));
    vec![
        pf.join(INSTALL_DIR_NAME).join(EXECUTABLE_NAME),
        pfx86.join(INSTALL_DIR_NAME).join(EXECUTABLE_NAME),
    ]
}

#[cfg(not(windows))]
fn standard_locations() -> Vec<PathBuf> {
    ["/usr/bin", "/usr/games", "/usr/local/bin", "/opt/warzone2100/bin"]
        .iter()
        .map(|dir| Path::new(dir).join(EXECUTABLE_NAME))
        .collect()
}

#[cfg(windows)]
fn default_steam_probe() -> Box<dyn SteamRootProbe> {
    Box::new(RegistryProbe)
}

#[cfg(not(windows))]
fn default_steam_probe() -> Box<dyn SteamRootProbe> {
    Box::new(HomeDirProbe::from_env())
}
