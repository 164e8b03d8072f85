//! The structured diagnostic-suggestion report and the chat response.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    conversation::Demographics, prediction::PredictionScores, symptom::SymptomSet,
};

/// Identifier of a stored report, e.g. `rep_1a2b3c4d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    /// A new identifier: `rep_` followed by eight lowercase hex characters.
    pub fn new() -> Self {
        let hex = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("rep_{}", &hex[..8]))
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

/// The patient demographics as captured in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub name: String,
    pub age: String,
    pub gender: String,
}

impl PatientSnapshot {
    /// Snapshot `demographics`, filling unset slots with placeholders.
    pub fn from_demographics(demographics: &Demographics) -> Self {
        Self {
            name: demographics.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            age: demographics.age.clone().unwrap_or_else(|| "N/A".to_string()),
            gender: demographics.gender.clone().unwrap_or_else(|| "N/A".to_string()),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            age: "N/A".to_string(),
            gender: "N/A".to_string(),
        }
    }
}

/// A doctor suggested alongside every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorRecommendation {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub experience: String,
}

/// An immutable report, created once per completed prediction cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: ReportId,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub patient: PatientSnapshot,
    pub symptoms: SymptomSet,
    pub predictions: PredictionScores,
    pub recommended_doctors: Vec<DoctorRecommendation>,
    pub notes: String,
}

/// Handle to a patient's report document, returned when it is created.
///
/// Every later append names the document through this handle; there is no
/// ambient "current document".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub path: PathBuf,
}

/// What the assistant returns for one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub reply: String,
    pub extracted_symptoms: SymptomSet,
    pub primary_prediction: Option<String>,
    pub confidence: Option<f32>,
    /// Present only on turns that ran a full prediction cycle.
    pub report: Option<Report>,
}

impl ChatResponse {
    /// A reply that carries no extraction or prediction data.
    pub fn prompt(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            extracted_symptoms: SymptomSet::new(),
            primary_prediction: None,
            confidence: None,
            report: None,
        }
    }
}
