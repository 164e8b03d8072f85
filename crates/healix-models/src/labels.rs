//! Class-index to disease-name lookup from a CSV side table.
//!
//! The table needs a header naming an `Encoded` and a `Disease` column (in
//! any position, case-insensitive). Rows whose index is not a non-negative
//! integer, or that lack either column, are skipped with a warning. When an
//! index appears twice, the first row wins.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use healix_contracts::error::{HealixError, HealixResult};
use healix_core::traits::LabelLookup;

const INDEX_COLUMN: &str = "encoded";
const NAME_COLUMN: &str = "disease";

#[derive(Debug, Clone, Default)]
pub struct CsvLabelLookup {
    labels: HashMap<usize, String>,
}

impl CsvLabelLookup {
    pub fn from_file(path: &Path) -> HealixResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| HealixError::ArtifactLoad {
            path: path.display().to_string(),
            reason: format!("failed to read file: {e}"),
        })?;
        Self::from_csv_str(&path.display().to_string(), &contents)
    }

    pub fn from_csv_str(source: &str, contents: &str) -> HealixResult<Self> {
        let mut lines = contents.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or_else(|| HealixError::ArtifactLoad {
            path: source.to_string(),
            reason: "label table is empty".to_string(),
        })?;

        let columns: Vec<String> = split_row(header).iter().map(|c| c.to_lowercase()).collect();
        let position = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| HealixError::ArtifactLoad {
                path: source.to_string(),
                reason: format!("header has no '{name}' column"),
            })
        };
        let index_at = position(INDEX_COLUMN)?;
        let name_at = position(NAME_COLUMN)?;

        let mut labels = HashMap::new();
        for (line_no, line) in lines.enumerate() {
            let fields = split_row(line);
            let parsed = fields
                .get(index_at)
                .and_then(|raw| raw.parse::<usize>().ok())
                .zip(fields.get(name_at).filter(|n| !n.is_empty()));
            match parsed {
                Some((index, name)) => {
                    labels.entry(index).or_insert_with(|| name.clone());
                }
                None => warn!(source, row = line_no + 2, "skipping malformed label row"),
            }
        }

        debug!(source, labels = labels.len(), "label table loaded");
        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl LabelLookup for CsvLabelLookup {
    fn label_for(&self, class_index: usize) -> Option<String> {
        self.labels.get(&class_index).cloned()
    }
}

/// Split one CSV row, honouring double-quoted fields and `""` escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
