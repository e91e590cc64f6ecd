//! # File-backed Slot Storage
//!
//! One `<slot>.json` file per slot inside a directory. The files are plain
//! JSON arrays, readable and editable by hand.
//!
//! Writes go to a temporary sibling first and are renamed into place.

use super::SlotStore;
use crate::LedgerError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A slot store keeping each slot as a JSON file in one directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    /// Use `dir` as the slot directory, creating it if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| LedgerError::IoError(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, LedgerError> {
        if key.is_empty() || key.contains(['/', '\\', '.']) {
            return Err(LedgerError::IoError(format!("Invalid slot key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl SlotStore for FileSlots {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::IoError(format!(
                "Cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).map_err(|e| {
            LedgerError::IoError(format!("Cannot write {}: {}", staging.display(), e))
        })?;
        fs::rename(&staging, &path).map_err(|e| {
            LedgerError::IoError(format!("Cannot replace {}: {}", path.display(), e))
        })?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
