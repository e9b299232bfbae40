//! Save-file persistence layer.
//!
//! RULE: Only store.rs touches the file system.
//! The engine hands it bytes and gets bytes back; it never opens files.

use crate::error::{SaveError, SaveResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Write `{path}.tmp`, sync, rename over the target.
    /// An interrupted write leaves the previous save intact.
    Atomic,
    /// Truncate and overwrite in place.
    Direct,
}

#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn exists(&self) -> bool { self.path.is_file() }

    /// Read the whole file. A missing file is `NotFound`, not `Io`.
    pub fn read(&self) -> SaveResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| self.map_missing(e))
    }

    pub fn write(&self, bytes: &[u8], mode: WriteMode) -> SaveResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        match mode {
            WriteMode::Atomic => {
                let tmp = self.tmp_path();
                if let Err(e) = write_synced(&tmp, bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
                    // The target is untouched; don't leave the partial copy behind.
                    if let Err(cleanup) = fs::remove_file(&tmp) {
                        if cleanup.kind() != ErrorKind::NotFound {
                            log::warn!("store: could not remove {}: {cleanup}", tmp.display());
                        }
                    }
                    return Err(e.into());
                }
            }
            WriteMode::Direct => {
                let mut file = File::create(&self.path)?;
                file.write_all(bytes)?;
                file.flush()?;
            }
        }
        log::debug!("store: wrote {} bytes to {} ({mode:?})", bytes.len(), self.path.display());
        Ok(())
    }

    pub fn remove(&self) -> SaveResult<()> {
        fs::remove_file(&self.path).map_err(|e| self.map_missing(e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn map_missing(&self, e: std::io::Error) -> SaveError {
        if e.kind() == ErrorKind::NotFound {
            SaveError::NotFound { path: self.path.display().to_string() }
        } else {
            SaveError::Io(e)
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
