//! The set of symptoms extracted from one patient message.

use serde::{Deserialize, Serialize};

/// A de-duplicated, deterministically ordered collection of symptom strings.
///
/// Entries produced by the rich extractor are vocabulary members; entries
/// produced by the keyword fallback may be arbitrary free-text fragments.
/// Insertion order is kept so the same input always serializes identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymptomSet(Vec<String>);

impl SymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `symptom` unless it is already present. Returns true if inserted.
    pub fn insert(&mut self, symptom: impl Into<String>) -> bool {
        let symptom = symptom.into();
        if self.0.contains(&symptom) {
            return false;
        }
        self.0.push(symptom);
        true
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.0.iter().any(|s| s == symptom)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// The symptoms as one comma-separated string (the classical model input).
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for SymptomSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SymptomSet::new();
        for symptom in iter {
            set.insert(symptom);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_ignores_duplicates_and_keeps_order() {
        let mut set = SymptomSet::new();
        assert!(set.insert("fever"));
        assert!(set.insert("cough"));
        assert!(!set.insert("fever"));

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice(), ["fever".to_string(), "cough".to_string()]);
    }

    #[test]
    fn joined_uses_comma_space() {
        let set: SymptomSet = ["headache", "nausea"].into_iter().collect();
        assert_eq!(set.joined(), "headache, nausea");
    }

    #[test]
    fn serializes_as_plain_array() {
        let set: SymptomSet = ["fever"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["fever"]"#);
    }
}
