//! # healix-store
//!
//! Persistence for finished reports and per-patient report documents.
//!
//! - [`InMemoryReportStore`]: reports in a `Vec`, for tests and ephemeral runs
//! - [`JsonFileReportStore`]: reports in one JSON array on disk
//! - [`JsonArrayFile`]: the on-disk record array behind the file stores
//! - [`JsonDocumentWriter`]: one JSON document per patient, appended to after
//!   every prediction cycle
//!
//! Reports are append-only: no store exposes an update or delete operation.

pub mod document;
pub mod file;
pub mod json_array;
pub mod memory;

pub use document::JsonDocumentWriter;
pub use file::JsonFileReportStore;
pub use json_array::JsonArrayFile;
pub use memory::InMemoryReportStore;
