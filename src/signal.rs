//! Viewer-open flag file.
//!
//! While the timeline viewer is on screen a `.timeline_open` file exists in
//! the data directory so the capture service can pause recording. The guard
//! removes the file when dropped, including on panic unwind.

use std::{fs, path::PathBuf, process};

use anyhow::{Context, Result};
use log::warn;

pub struct ViewerSignal {
    path: PathBuf,
}

impl ViewerSignal {
    /// Create the flag file, overwriting a stale one from a crashed viewer.
    pub fn raise(path: PathBuf) -> Result<Self> {
        fs::write(&path, process::id().to_string())
            .with_context(|| format!("failed to create signal file {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for ViewerSignal {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if self.path.exists() {
                warn!("failed to remove signal file {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_creates_and_drop_removes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".timeline_open");

        let signal = ViewerSignal::raise(path.clone()).unwrap();
        assert!(path.exists());
        let pid: u32 = fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(pid, process::id());

        drop(signal);
        assert!(!path.exists());
    }

    #[test]
    fn raise_overwrites_a_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".timeline_open");
        fs::write(&path, "99999").unwrap();

        let _signal = ViewerSignal::raise(path.clone()).unwrap();
        let pid: u32 = fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(pid, process::id());
    }

    #[test]
    fn drop_tolerates_an_already_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".timeline_open");
        let signal = ViewerSignal::raise(path.clone()).unwrap();
        fs::remove_file(&path).unwrap();
        drop(signal);
    }
}
