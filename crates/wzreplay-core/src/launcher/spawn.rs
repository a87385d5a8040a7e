//! Fire-and-forget process creation.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Starts external programs without waiting on them.
pub trait Spawner {
    /// Run `program` with `args`; return as soon as the process exists.
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> io::Result<()>;

    /// Hand `target` (a URI or a folder) to the platform's default opener.
    fn open_detached(&self, target: &OsStr) -> io::Result<()>;
}

/// Real processes: `std::process::Command` and the `open` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSpawner;

impl Spawner for SystemSpawner {
    fn spawn_detached(&self, program: &Path, args: &[OsString]) -> io::Result<()> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = program.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group: the game outlives the handler.
            command.process_group(0);
        }

        // Dropping the Child neither waits nor kills.
        command.spawn().map(|_child| ())
    }

    fn open_detached(&self, target: &OsStr) -> io::Result<()> {
        open::that_detached(target)
    }
}
