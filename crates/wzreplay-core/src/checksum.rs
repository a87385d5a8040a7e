//! Size and SHA-256 of a downloaded artifact, logged so repeated runs can be compared.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// What ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
    pub bytes: u64,
    /// Lowercase hex.
    pub sha256: String,
}

impl fmt::Display for ArtifactDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes, sha256 {}", self.bytes, self.sha256)
    }
}

/// Hashes the file at `path` by streaming it through the hasher.
pub fn digest_artifact(path: &Path) -> Result<ArtifactDigest> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let bytes = io::copy(&mut BufReader::new(file), &mut hasher)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(ArtifactDigest {
        bytes,
        sha256: hex::encode(hasher.finalize()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wzrp");
        std::fs::write(&path, b"").unwrap();
        let d = digest_artifact(&path).unwrap();
        assert_eq!(d.bytes, 0);
        assert_eq!(
            d.sha256,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_content_and_display() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.wzrp");
        std::fs::write(&path, b"hello\n").unwrap();
        let d = digest_artifact(&path).unwrap();
        assert_eq!(
            d.to_string(),
            "6 bytes, sha256 5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn missing_artifact_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(digest_artifact(&dir.path().join("none.wzrp")).is_err());
    }
}
