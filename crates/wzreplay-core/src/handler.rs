//! The whole invocation: parse → validate → locate → download → launch.
//!
//! One call to [`Handler::run`] per process. Stages run strictly in order and
//! the first fatal error stops the pipeline; launch problems never do.

use std::path::{Path, PathBuf};

use crate::checksum::digest_artifact;
use crate::config::HandlerConfig;
use crate::downloader::Downloader;
use crate::error::{HandlerError, HandlerResult};
use crate::launcher::{execute, plan_launch, LaunchOutcome, Spawner, SystemSpawner};
use crate::locator::{resolve_replay_dir, user_data_root, ExecutableSearch, InstallLayout};
use crate::logging::LogSink;
use crate::protocol::parse_protocol_arg;
use crate::url_model::{derive_replay_filename, AllowPolicy, ReplayUrl};

/// Record of a single process-lifetime unit of work.
#[derive(Debug, Default)]
pub struct Invocation {
    pub raw_argument: Option<String>,
    pub replay_url: Option<ReplayUrl>,
    /// Final path of the downloaded artifact, set once the destination is resolved.
    pub destination: Option<PathBuf>,
    pub launch: Option<LaunchOutcome>,
    pub error: Option<HandlerError>,
}

impl Invocation {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn exit_code(&self) -> u8 {
        self.error.as_ref().map_or(0, HandlerError::exit_code)
    }
}

/// Pipeline wiring. Built from config, with seams for the user-data root,
/// executable search and process spawning.
pub struct Handler<'a> {
    policy: AllowPolicy,
    data_root: Option<PathBuf>,
    layout: InstallLayout,
    executables: ExecutableSearch,
    downloader: Downloader,
    spawner: Box<dyn Spawner>,
    steam_app_id: String,
    launch_enabled: bool,
    log: &'a dyn LogSink,
}

impl<'a> Handler<'a> {
    pub fn from_config(cfg: &HandlerConfig, log: &'a dyn LogSink) -> Self {
        Self {
            policy: cfg.policy.to_policy(),
            data_root: None,
            layout: InstallLayout::default(),
            executables: ExecutableSearch::platform_default(),
            downloader: Downloader::new(&cfg.download),
            spawner: Box::new(SystemSpawner),
            steam_app_id: cfg.launch.steam_app_id.clone(),
            launch_enabled: true,
            log,
        }
    }

    /// Use `root` instead of the platform environment variable.
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    pub fn with_layout(mut self, layout: InstallLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_executables(mut self, search: ExecutableSearch) -> Self {
        self.executables = search;
        self
    }

    pub fn with_spawner(mut self, spawner: Box<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Download only; skip the launcher.
    pub fn without_launch(mut self) -> Self {
        self.launch_enabled = false;
        self
    }

    /// Runs the pipeline for `raw` (the sole command-line argument, if any).
    pub fn run(&self, raw: Option<&str>) -> Invocation {
        let mut inv = Invocation {
            raw_argument: raw.map(str::to_string),
            ..Default::default()
        };
        if let Err(e) = self.run_stages(raw, &mut inv) {
            self.log.error(&format!("ERROR: {}", e));
            inv.error = Some(e);
        }
        inv
    }

    fn run_stages(&self, raw: Option<&str>, inv: &mut Invocation) -> HandlerResult<()> {
        let raw = raw.ok_or(HandlerError::Usage)?;
        self.log.info(&format!("Received argument: {}", raw));

        let candidate = parse_protocol_arg(raw)?;
        self.log.info(&format!("Parsed replay URL: {}", candidate));

        let url = self
            .policy
            .check(&candidate)
            .map_err(|reason| HandlerError::Validation {
                url: candidate.clone(),
                reason: reason.to_string(),
            })?;
        inv.replay_url = Some(url.clone());

        let root = match &self.data_root {
            Some(r) => r.clone(),
            None => user_data_root()?,
        };
        let (_, target_dir) = resolve_replay_dir(&root, &self.layout, self.log)?;
        let dest = target_dir.join(derive_replay_filename(&url, self.policy.extension()));
        inv.destination = Some(dest.clone());

        self.downloader.fetch(&url, &self.policy, &dest, self.log)?;
        self.log_digest(&dest);

        if self.launch_enabled {
            let executable = self.executables.find(self.log);
            let plan = plan_launch(executable.as_deref(), &dest, &self.steam_app_id);
            inv.launch = Some(execute(&plan, &*self.spawner, self.log));
        } else {
            self.log.info("Launch skipped");
        }
        Ok(())
    }

    fn log_digest(&self, dest: &Path) {
        match digest_artifact(dest) {
            Ok(digest) => self.log.info(&format!("Artifact: {}", digest)),
            Err(e) => self.log.warn(&format!("Could not hash {}: {:#}", dest.display(), e)),
        }
    }
}
