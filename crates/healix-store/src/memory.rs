//! In-memory `ReportStore`, for tests and ephemeral runs.

use std::sync::{Arc, Mutex};

use tracing::debug;

use healix_contracts::{
    error::{HealixError, HealixResult},
    report::Report,
};
use healix_core::traits::ReportStore;

/// Keeps reports in a `Vec` behind a `Mutex`.
///
/// Cloning shares the underlying list, so a test can keep a clone and
/// observe what the pipeline appended.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportStore {
    reports: Arc<Mutex<Vec<Report>>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for InMemoryReportStore {
    fn append(&self, report: &Report) -> HealixResult<()> {
        let mut reports = self.reports.lock().map_err(|e| HealixError::StorageWrite {
            reason: format!("report store lock poisoned: {e}"),
        })?;
        reports.push(report.clone());
        debug!(report_id = %report.report_id.0, total = reports.len(), "report stored in memory");
        Ok(())
    }

    fn list(&self) -> HealixResult<Vec<Report>> {
        let reports = self.reports.lock().map_err(|e| HealixError::StorageRead {
            reason: format!("report store lock poisoned: {e}"),
        })?;
        Ok(reports.clone())
    }
}

#[cfg(test)]
mod tests {
    use healix_core::ReportAssembler;

    use super::*;
    use crate::tests::sample_report;

    #[test]
    fn append_preserves_insertion_order() {
        let store = InMemoryReportStore::new();
        let first = sample_report(&ReportAssembler::default(), "Influenza");
        let second = sample_report(&ReportAssembler::default(), "Migraine");

        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[test]
    fn clones_share_storage() {
        let store = InMemoryReportStore::new();
        let observer = store.clone();
        store.append(&sample_report(&ReportAssembler::default(), "Influenza")).unwrap();
        assert_eq!(observer.list().unwrap().len(), 1);
    }
}
