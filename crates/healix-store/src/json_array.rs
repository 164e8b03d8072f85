//! A JSON array of records in one file, shared by the file-backed stores.
//!
//! Reads for listing are lenient: a missing, unreadable or unparsable file
//! lists as empty. Reads that precede a write are strict. An unreadable
//! file fails the write with `StorageRead` and is left untouched. A file
//! that reads but does not parse is renamed to `<name>.corrupt-<timestamp>`
//! before the new array is written, so its records can still be recovered.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use healix_contracts::error::{HealixError, HealixResult};

#[derive(Debug, Clone)]
pub struct JsonArrayFile {
    path: PathBuf,
}

impl JsonArrayFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record, or an empty list if the file cannot be used.
    pub fn read_lenient<T: DeserializeOwned>(&self) -> Vec<T> {
        let contents = match self.read_contents() {
            Ok(Some(c)) => c,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "file unreadable; listing as empty");
                return Vec::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "file does not parse; listing as empty");
            Vec::new()
        })
    }

    /// Every record, for a read-modify-write cycle.
    ///
    /// # Errors
    ///
    /// `StorageRead` if the file exists but cannot be read, or if a file that
    /// does not parse cannot be moved aside.
    pub fn read_for_update<T: DeserializeOwned>(&self) -> HealixResult<Vec<T>> {
        let Some(contents) = self.read_contents()? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                let quarantine = self.quarantine()?;
                warn!(
                    path = %self.path.display(),
                    moved_to = %quarantine.display(),
                    error = %e,
                    "file does not parse; moved aside before writing"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Replace the file with `records` via a sibling temp file and a rename.
    pub fn write<T: Serialize>(&self, records: &[T]) -> HealixResult<()> {
        let write_err = |e: std::io::Error| HealixError::StorageWrite {
            reason: format!("failed to write '{}': {}", self.path.display(), e),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|e| HealixError::StorageWrite {
            reason: format!("failed to serialize '{}': {}", self.path.display(), e),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)
    }

    /// File contents; `None` when the file is absent or blank.
    fn read_contents(&self) -> HealixResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(c) if c.trim().is_empty() => Ok(None),
            Ok(c) => Ok(Some(c)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HealixError::StorageRead {
                reason: format!("failed to read '{}': {}", self.path.display(), e),
            }),
        }
    }

    fn quarantine(&self) -> HealixResult<PathBuf> {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "records".to_string());
        let stamp = Utc::now().format("%Y%m%d%H%M%S");

        let mut target = self.path.with_file_name(format!("{name}.corrupt-{stamp}"));
        let mut n = 2;
        while target.exists() {
            target = self.path.with_file_name(format!("{name}.corrupt-{stamp}-{n}"));
            n += 1;
        }
        std::fs::rename(&self.path, &target).map_err(|e| HealixError::StorageRead {
            reason: format!("failed to move aside unparsable '{}': {}", self.path.display(), e),
        })?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn corrupt_siblings(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains(".corrupt-"))
            .collect()
    }

    #[test]
    fn absent_and_blank_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let file = JsonArrayFile::new(dir.path().join("records.json"));
        assert!(file.read_for_update::<u32>().unwrap().is_empty());

        std::fs::write(file.path(), "  \n").unwrap();
        assert!(file.read_lenient::<u32>().is_empty());
        assert!(file.read_for_update::<u32>().unwrap().is_empty());
    }

    #[test]
    fn unparsable_file_is_moved_aside_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let file = JsonArrayFile::new(dir.path().join("records.json"));
        std::fs::write(file.path(), "[1, 2,").unwrap();

        assert!(file.read_lenient::<u32>().is_empty());
        assert!(corrupt_siblings(dir.path()).is_empty(), "listing never moves files");

        let records: Vec<u32> = file.read_for_update().unwrap();
        assert!(records.is_empty());
        file.write(&[7u32]).unwrap();

        let moved = corrupt_siblings(dir.path());
        assert_eq!(moved.len(), 1);
        assert_eq!(std::fs::read_to_string(&moved[0]).unwrap(), "[1, 2,");
        assert_eq!(file.read_lenient::<u32>(), vec![7]);
    }

    #[test]
    fn unreadable_file_fails_the_update_and_stays_in_place() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be cannot be read as a string.
        let path = dir.path().join("records.json");
        std::fs::create_dir(&path).unwrap();
        let file = JsonArrayFile::new(&path);

        assert!(file.read_lenient::<u32>().is_empty());
        let err = file.read_for_update::<u32>().unwrap_err();
        assert!(matches!(err, HealixError::StorageRead { .. }));
        assert!(path.is_dir());
    }
}
