//! `ReportStore` backed by a single JSON array on disk.
//!
//! Appends are read-modify-write under a process-local mutex. Listing never
//! fails on a damaged file; appending never silently drops what is already
//! there (see [`JsonArrayFile`]).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use healix_contracts::{
    error::{HealixError, HealixResult},
    report::Report,
};
use healix_core::traits::ReportStore;

use crate::json_array::JsonArrayFile;

#[derive(Debug)]
pub struct JsonFileReportStore {
    file: JsonArrayFile,
    lock: Mutex<()>,
}

impl JsonFileReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { file: JsonArrayFile::new(path), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl ReportStore for JsonFileReportStore {
    fn append(&self, report: &Report) -> HealixResult<()> {
        let _guard = self.lock.lock().map_err(|e| HealixError::StorageWrite {
            reason: format!("report file lock poisoned: {e}"),
        })?;

        let mut reports: Vec<Report> = self.file.read_for_update()?;
        reports.push(report.clone());
        self.file.write(&reports)?;

        debug!(
            path = %self.path().display(),
            report_id = %report.report_id.0,
            total = reports.len(),
            "report appended"
        );
        Ok(())
    }

    fn list(&self) -> HealixResult<Vec<Report>> {
        let _guard = self.lock.lock().map_err(|e| HealixError::StorageRead {
            reason: format!("report file lock poisoned: {e}"),
        })?;
        Ok(self.file.read_lenient())
    }
}
