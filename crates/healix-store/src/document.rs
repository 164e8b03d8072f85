//! Per-patient report documents.
//!
//! One document is created when a patient finishes the demographic slots:
//! `<reports_dir>/<name>_<YYYYmmdd_HHMMSS>.pdf`. Despite the extension the
//! content is JSON:
//!
//! ```json
//! {
//!   "patient": { "name": "Alice", "age": "29", "gender": "female" },
//!   "created_at": "2026-10-17T09:30:00Z",
//!   "entries": [ { "timestamp": "…", "model_output": { … } } ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use healix_contracts::{
    error::{HealixError, HealixResult},
    report::{DocumentHandle, PatientSnapshot},
};
use healix_core::traits::DocumentWriter;

pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
/// A name that is empty after trimming becomes `patient`.
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "patient".to_string();
    }
    trimmed
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

#[derive(Debug)]
pub struct JsonDocumentWriter {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl JsonDocumentWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), lock: Mutex::new(()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// First unused path for `stem`; `_2`, `_3`, … are appended on collision.
    fn unused_path(&self, stem: &str) -> PathBuf {
        let mut path = self.dir.join(format!("{stem}.{DOCUMENT_EXTENSION}"));
        let mut n = 2;
        while path.exists() {
            path = self.dir.join(format!("{stem}_{n}.{DOCUMENT_EXTENSION}"));
            n += 1;
        }
        path
    }

    fn guard(&self) -> HealixResult<std::sync::MutexGuard<'_, ()>> {
        self.lock.lock().map_err(|e| HealixError::StorageWrite {
            reason: format!("document writer lock poisoned: {e}"),
        })
    }
}

fn write_json(path: &Path, value: &Value) -> HealixResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| HealixError::StorageWrite {
        reason: format!("failed to serialize document: {e}"),
    })?;
    std::fs::write(path, json).map_err(|e| HealixError::StorageWrite {
        reason: format!("failed to write '{}': {}", path.display(), e),
    })
}

impl DocumentWriter for JsonDocumentWriter {
    fn create(&self, patient: &PatientSnapshot) -> HealixResult<DocumentHandle> {
        let _guard = self.guard()?;
        std::fs::create_dir_all(&self.dir).map_err(|e| HealixError::StorageWrite {
            reason: format!("failed to create '{}': {}", self.dir.display(), e),
        })?;

        let now = Utc::now();
        let stem = format!("{}_{}", sanitize_filename(&patient.name), now.format("%Y%m%d_%H%M%S"));
        let path = self.unused_path(&stem);

        let document = json!({
            "patient": patient,
            "created_at": now.to_rfc3339(),
            "entries": [],
        });
        write_json(&path, &document)?;

        debug!(path = %path.display(), "patient document created");
        Ok(DocumentHandle { path })
    }

    fn append(&self, handle: &DocumentHandle, entry: &Value) -> HealixResult<()> {
        let _guard = self.guard()?;
        let path = &handle.path;

        let contents = std::fs::read_to_string(path).map_err(|e| HealixError::StorageRead {
            reason: format!("failed to read '{}': {}", path.display(), e),
        })?;
        let mut document: Value = serde_json::from_str(&contents).map_err(|e| HealixError::StorageRead {
            reason: format!("document '{}' is not valid JSON: {}", path.display(), e),
        })?;

        let record = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "model_output": entry,
        });
        if !document.get("entries").is_some_and(Value::is_array) {
            let object = document.as_object_mut().ok_or_else(|| HealixError::StorageRead {
                reason: format!("document '{}' is not a JSON object", path.display()),
            })?;
            object.insert("entries".to_string(), json!([]));
        }
        if let Some(entries) = document.get_mut("entries").and_then(Value::as_array_mut) {
            entries.push(record);
        }

        write_json(path, &document)?;
        debug!(path = %path.display(), "entry appended to patient document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn alice() -> PatientSnapshot {
        PatientSnapshot { name: "Alice Smith".into(), age: "29".into(), gender: "female".into() }
    }

    fn read(handle: &DocumentHandle) -> Value {
        serde_json::from_str(&std::fs::read_to_string(&handle.path).unwrap()).unwrap()
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("Alice Smith"), "Alice_Smith");
        assert_eq!(sanitize_filename("../etc/passwd"), "___etc_passwd");
        assert_eq!(sanitize_filename("jean-luc_2"), "jean-luc_2");
        assert_eq!(sanitize_filename("   "), "patient");
    }

    #[test]
    fn create_writes_header_with_empty_entries() {
        let dir = TempDir::new().unwrap();
        let writer = JsonDocumentWriter::new(dir.path().join("reports"));

        let handle = writer.create(&alice()).unwrap();
        let file_name = handle.path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(file_name.starts_with("Alice_Smith_"), "{file_name}");
        assert!(file_name.ends_with(".pdf"));

        let doc = read(&handle);
        assert_eq!(doc["patient"]["name"], "Alice Smith");
        assert_eq!(doc["patient"]["gender"], "female");
        assert!(doc["created_at"].is_string());
        assert_eq!(doc["entries"], json!([]));
    }

    #[test]
    fn append_goes_to_the_named_document_only() {
        let dir = TempDir::new().unwrap();
        let writer = JsonDocumentWriter::new(dir.path());

        let a = writer.create(&alice()).unwrap();
        let b = writer.create(&PatientSnapshot::anonymous()).unwrap();
        assert_ne!(a.path, b.path);

        writer.append(&a, &json!({"symptoms": ["fever"]})).unwrap();
        writer.append(&a, &json!({"symptoms": ["cough"]})).unwrap();

        let doc_a = read(&a);
        let entries = doc_a["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["model_output"]["symptoms"][0], "cough");
        assert!(entries[0]["timestamp"].is_string());

        assert_eq!(read(&b)["entries"], json!([]));
    }

    #[test]
    fn same_second_documents_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let writer = JsonDocumentWriter::new(dir.path());
        let first = writer.create(&alice()).unwrap();
        let second = writer.create(&alice()).unwrap();
        assert_ne!(first.path, second.path);
    }

    #[test]
    fn append_to_missing_document_fails() {
        let dir = TempDir::new().unwrap();
        let writer = JsonDocumentWriter::new(dir.path());
        let handle = DocumentHandle { path: dir.path().join("gone.pdf") };
        assert!(writer.append(&handle, &json!({})).is_err());
    }
}
