//! Starting the game once the replay is on disk.
//!
//! The decision is made up front as a [`LaunchPlan`]: run the found binary
//! with `--loadreplay=<file>`, or (no binary) start the game through Steam and
//! open the replay folder. Executing the plan never fails the invocation;
//! every problem becomes a [`LaunchWarning`].

mod spawn;

pub use spawn::{Spawner, SystemSpawner};

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::logging::LogSink;

/// What the launcher is going to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    /// Run the game binary with the replay preloaded.
    Direct { program: PathBuf, args: Vec<OsString> },
    /// Start the game by platform identifier (no file argument) and show the replay folder.
    Degraded { app_uri: String, folder: PathBuf },
}

/// Which branch a [`LaunchOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchBranch {
    Direct,
    Degraded,
}

/// A best-effort launch step that did not work out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchWarning {
    pub step: &'static str,
    pub message: String,
}

impl fmt::Display for LaunchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub branch: LaunchBranch,
    pub warnings: Vec<LaunchWarning>,
}

/// `steam://rungameid/<id>`.
pub fn steam_run_uri(steam_app_id: &str) -> String {
    format!("steam://rungameid/{}", steam_app_id)
}

/// `--loadreplay=<path>` as a single argument.
pub fn load_replay_arg(artifact: &Path) -> OsString {
    let mut arg = OsString::from("--loadreplay=");
    arg.push(artifact.as_os_str());
    arg
}

/// Chooses the branch. Pure: touches neither processes nor the filesystem.
pub fn plan_launch(executable: Option<&Path>, artifact: &Path, steam_app_id: &str) -> LaunchPlan {
    match executable {
        Some(exe) => LaunchPlan::Direct {
            program: exe.to_path_buf(),
            args: vec![load_replay_arg(artifact)],
        },
        None => LaunchPlan::Degraded {
            app_uri: steam_run_uri(steam_app_id),
            folder: artifact
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        },
    }
}

/// Carries out `plan` through `spawner`. Never blocks on the started process.
pub fn execute(plan: &LaunchPlan, spawner: &dyn Spawner, log: &dyn LogSink) -> LaunchOutcome {
    let mut warnings = Vec::new();
    let mut warn = |step: &'static str, message: String| {
        let w = LaunchWarning { step, message };
        log.warn(&w.to_string());
        warnings.push(w);
    };

    let branch = match plan {
        LaunchPlan::Direct { program, args } => {
            let shown: Vec<_> = args.iter().map(|a| a.to_string_lossy()).collect();
            log.info(&format!("Launching Warzone: {} {}", program.display(), shown.join(" ")));
            if let Err(e) = spawner.spawn_detached(program, args) {
                warn("game launch failed", e.to_string());
            }
            LaunchBranch::Direct
        }
        LaunchPlan::Degraded { app_uri, folder } => {
            warn(
                "executable not found",
                format!("falling back to {}; load the replay from the game", app_uri),
            );
            if let Err(e) = spawner.open_detached(app_uri.as_ref()) {
                warn("Steam launch failed", e.to_string());
            }
            if let Err(e) = spawner.open_detached(folder.as_os_str()) {
                warn("opening replay folder failed", e.to_string());
            }
            LaunchBranch::Degraded
        }
    };

    LaunchOutcome { branch, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use std::cell::RefCell;
    use std::ffi::OsStr;
    use std::io;

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Spawner for Recorder {
        fn spawn_detached(&self, program: &Path, args: &[OsString]) -> io::Result<()> {
            let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
            self.calls
                .borrow_mut()
                .push(format!("spawn {} {}", program.display(), args.join(" ")));
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
            }
            Ok(())
        }

        fn open_detached(&self, target: &OsStr) -> io::Result<()> {
            self.calls
                .borrow_mut()
                .push(format!("open {}", target.to_string_lossy()));
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Other, "no opener"));
            }
            Ok(())
        }
    }

    #[test]
    fn plan_direct_when_executable_found() {
        let plan = plan_launch(
            Some(Path::new("/games/wz/warzone2100")),
            Path::new("/data/replay/multiplay/a.wzrp"),
            "1241950",
        );
        assert_eq!(
            plan,
            LaunchPlan::Direct {
                program: PathBuf::from("/games/wz/warzone2100"),
                args: vec![OsString::from("--loadreplay=/data/replay/multiplay/a.wzrp")],
            }
        );
    }

    #[test]
    fn plan_degraded_when_not_found() {
        let plan = plan_launch(None, Path::new("/data/replay/multiplay/a.wzrp"), "1241950");
        assert_eq!(
            plan,
            LaunchPlan::Degraded {
                app_uri: "steam://rungameid/1241950".into(),
                folder: PathBuf::from("/data/replay/multiplay"),
            }
        );
    }

    #[test]
    fn execute_direct_spawns_once() {
        let plan = plan_launch(Some(Path::new("/g/wz")), Path::new("/r/a.wzrp"), "1");
        let spawner = Recorder::default();
        let log = MemoryLog::new();
        let outcome = execute(&plan, &spawner, &log);
        assert_eq!(outcome.branch, LaunchBranch::Direct);
        assert!(outcome.warnings.is_empty());
        assert_eq!(*spawner.calls.borrow(), vec!["spawn /g/wz --loadreplay=/r/a.wzrp"]);
    }

    #[test]
    fn execute_degraded_opens_uri_then_folder() {
        let plan = plan_launch(None, Path::new("/r/a.wzrp"), "1241950");
        let spawner = Recorder::default();
        let outcome = execute(&plan, &spawner, &MemoryLog::new());
        assert_eq!(outcome.branch, LaunchBranch::Degraded);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].step, "executable not found");
        assert_eq!(
            *spawner.calls.borrow(),
            vec!["open steam://rungameid/1241950", "open /r"]
        );
    }

    #[test]
    fn failures_become_warnings() {
        let spawner = Recorder {
            fail: true,
            ..Default::default()
        };
        let log = MemoryLog::new();

        let degraded = execute(&plan_launch(None, Path::new("/r/a.wzrp"), "1"), &spawner, &log);
        assert_eq!(degraded.branch, LaunchBranch::Degraded);
        let steps: Vec<_> = degraded.warnings.iter().map(|w| w.step).collect();
        assert_eq!(
            steps,
            vec![
                "executable not found",
                "Steam launch failed",
                "opening replay folder failed"
            ]
        );

        let direct = execute(
            &plan_launch(Some(Path::new("/g/wz")), Path::new("/r/a.wzrp"), "1"),
            &spawner,
            &log,
        );
        assert_eq!(direct.branch, LaunchBranch::Direct);
        assert_eq!(direct.warnings.len(), 1);
        assert!(log.has(tracing::Level::WARN, "game launch failed"));
    }
}
