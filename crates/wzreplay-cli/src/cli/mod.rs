//! Command line of the `wzreplay:` link handler.
//!
//! The OS invokes the binary with the clicked link as the only argument; the
//! flags exist for manual runs and troubleshooting.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use wzreplay_core::config::{self, HandlerConfig};
use wzreplay_core::logging::{self, TracingSink};
use wzreplay_core::{Handler, HandlerError};

/// Opens `wzreplay:` links: downloads the replay into the game's replay folder and starts the game.
#[derive(Debug, Parser)]
#[command(name = "wzreplay-handler", version)]
#[command(about = "Handler for wzreplay:// replay links", long_about = None)]
pub struct Cli {
    /// The clicked link, e.g. wzreplay://open?url=https%3A%2F%2Fwz-2100.com%2Freplay.wzrp
    pub uri: Option<String>,

    /// Read configuration from this file instead of the per-user config.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Download the replay but do not start the game.
    #[arg(long)]
    pub no_launch: bool,

    /// Never open the log file after a failure.
    #[arg(long)]
    pub no_open_log: bool,
}

impl Cli {
    /// Parses the process arguments and runs one invocation. Returns the process exit code.
    pub fn run_from_args(log_file: Option<&Path>) -> u8 {
        Cli::parse().run(log_file)
    }

    pub fn run(&self, log_file: Option<&Path>) -> u8 {
        let cfg = match self.load_config() {
            Ok(cfg) => cfg,
            Err(err) => {
                let err = HandlerError::Config(err);
                tracing::error!("ERROR: {}", err);
                self.report(&err, &HandlerConfig::default(), log_file);
                return err.exit_code();
            }
        };
        tracing::debug!("loaded config: {:?}", cfg);

        let sink = TracingSink;
        let mut handler = Handler::from_config(&cfg, &sink);
        if self.no_launch {
            handler = handler.without_launch();
        }
        let invocation = handler.run(self.uri.as_deref());

        if let Some(launch) = &invocation.launch {
            for warning in &launch.warnings {
                eprintln!("wzreplay-handler: warning: {}", warning);
            }
        }
        match &invocation.error {
            Some(err) => {
                self.report(err, &cfg, log_file);
                err.exit_code()
            }
            None => 0,
        }
    }

    fn load_config(&self) -> Result<HandlerConfig> {
        match &self.config {
            Some(path) => config::load_from(path),
            None => config::load_or_init(),
        }
    }

    /// Tells the user about a fatal error: stderr, and the log file when configured.
    fn report(&self, err: &HandlerError, cfg: &HandlerConfig, log_file: Option<&Path>) {
        eprintln!("wzreplay-handler: {}", err);
        if self.no_open_log || !cfg.launch.open_log_on_error {
            return;
        }
        if let Some(path) = log_file {
            eprintln!("See {} for details.", path.display());
            if let Err(e) = logging::open_log_viewer(path) {
                tracing::warn!("could not open {}: {}", path.display(), e);
            }
        }
    }
}
