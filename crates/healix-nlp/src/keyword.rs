//! Lightweight keyword extraction with a free-text fallback.
//!
//! Used when the rich extractor is unavailable. Matches a short fixed list of
//! common symptoms by substring; when none occur, the first few comma- or
//! period-separated fragments of the message stand in as symptoms.

use tracing::debug;

use healix_contracts::symptom::SymptomSet;
use healix_core::traits::SymptomExtractor;

/// Common symptoms recognized by substring, in alphabetical order.
pub const COMMON_SYMPTOMS: &[&str] = &[
    "chest pain",
    "chills",
    "cough",
    "diarrhea",
    "dizziness",
    "fatigue",
    "fever",
    "headache",
    "joint pain",
    "muscle pain",
    "nausea",
    "rash",
    "runny nose",
    "shortness of breath",
    "sore throat",
    "vomiting",
];

/// Most fragments returned when no keyword matches.
pub const MAX_FRAGMENTS: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl SymptomExtractor for KeywordExtractor {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn extract(&self, text: &str) -> SymptomSet {
        let padded = format!(" {} ", text.to_lowercase());
        let found: SymptomSet =
            COMMON_SYMPTOMS.iter().filter(|s| padded.contains(*s)).copied().collect();
        if !found.is_empty() {
            return found;
        }

        let fragments: SymptomSet = text
            .split([',', '.'])
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .take(MAX_FRAGMENTS)
            .collect();
        debug!(fragments = fragments.len(), "no keyword matched; using text fragments");
        fragments
    }
}
