//! Disk side of a download: a `.part` sibling written sequentially, synced,
//! then atomically renamed onto the final name.
//!
//! A reader that sees the final filename always sees a complete file. A failed
//! transfer leaves at most the `.part` file behind.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `abc.wzrp` → `abc.wzrp.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for a temp download file.
pub struct StorageWriter {
    file: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create a new temp file at `temp_path`. Overwrites a leftover from an earlier run.
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(StorageWriter {
            file: BufWriter::new(file),
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    /// Append `data` at the current end of the file.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .context("storage write failed")?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush buffers and sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush().context("storage flush failed")?;
        self.file.get_ref().sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Atomically rename the temp file to the final path. Consumes the writer and closes the file.
    /// Replaces an existing file at `final_path`. Fails if `final_path` is on a different filesystem.
    pub fn finalize(mut self, final_path: &Path) -> Result<u64> {
        self.sync()?;
        let temp_path = self.temp_path.clone();
        let written = self.written;
        // Windows refuses to rename a file that is still open.
        drop(self.file);

        std::fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(written)
    }

    /// Close and delete the temp file. Errors are ignored; an orphaned `.part` is harmless.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        let _ = std::fs::remove_file(temp_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("abc.wzrp"));
        assert_eq!(p.to_string_lossy(), "abc.wzrp.part");
        let p2 = temp_path(Path::new("/tmp/replay/multiplay/x.wzrp"));
        assert_eq!(p2.to_string_lossy(), "/tmp/replay/multiplay/x.wzrp.part");
    }

    #[test]
    fn append_then_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("game.wzrp");
        let tp = temp_path(&final_path);

        let mut writer = StorageWriter::create(&tp).unwrap();
        writer.append(b"hello ").unwrap();
        writer.append(b"world").unwrap();
        assert_eq!(writer.written(), 11);
        assert!(!final_path.exists());

        let n = writer.finalize(&final_path).unwrap();
        assert_eq!(n, 11);
        assert!(!tp.exists());
        assert_eq!(std::fs::read(&final_path).unwrap(), b"hello world");
    }

    #[test]
    fn finalize_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("game.wzrp");
        std::fs::write(&final_path, b"old old old old").unwrap();

        let mut writer = StorageWriter::create(&temp_path(&final_path)).unwrap();
        writer.append(b"new").unwrap();
        writer.finalize(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"new");
    }

    #[test]
    fn discard_removes_temp_and_leaves_no_final() {
        let dir = tempfile::tempdir().unwrap();
        let final_path = dir.path().join("game.wzrp");
        let tp = temp_path(&final_path);
        let mut writer = StorageWriter::create(&tp).unwrap();
        writer.append(b"partial").unwrap();
        assert_eq!(writer.temp_path(), tp.as_path());
        writer.discard();
        assert!(!tp.exists());
        assert!(!final_path.exists());
    }

    #[test]
    fn create_truncates_leftover_part() {
        let dir = tempfile::tempdir().unwrap();
        let tp = dir.path().join("x.wzrp.part");
        std::fs::write(&tp, b"stale bytes from an interrupted run").unwrap();
        let mut writer = StorageWriter::create(&tp).unwrap();
        writer.append(b"ok").unwrap();
        let final_path = dir.path().join("x.wzrp");
        writer.finalize(&final_path).unwrap();
        assert_eq!(std::fs::read(&final_path).unwrap(), b"ok");
    }
}
