//! Builds the structured report and the patient-document entry.

use chrono::Utc;
use serde_json::{json, Value};

use healix_contracts::{
    conversation::Demographics,
    prediction::{ClassicalOutcome, ReconciledPrediction, SequenceOutcome},
    report::{DoctorRecommendation, PatientSnapshot, Report, ReportId},
    symptom::SymptomSet,
};

use crate::config::ReportSettings;

/// Assembles one `Report` per completed prediction cycle.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    doctors: Vec<DoctorRecommendation>,
    disclaimer: String,
}

impl ReportAssembler {
    pub fn new(doctors: Vec<DoctorRecommendation>, disclaimer: impl Into<String>) -> Self {
        Self { doctors, disclaimer: disclaimer.into() }
    }

    pub fn from_settings(settings: &ReportSettings) -> Self {
        Self::new(settings.doctors.clone(), settings.disclaimer.clone())
    }

    pub fn assemble(
        &self,
        demographics: &Demographics,
        symptoms: &SymptomSet,
        reconciled: &ReconciledPrediction,
    ) -> Report {
        Report {
            report_id: ReportId::new(),
            timestamp: Utc::now(),
            patient: PatientSnapshot::from_demographics(demographics),
            symptoms: symptoms.clone(),
            predictions: reconciled.scores.clone(),
            recommended_doctors: self.doctors.clone(),
            notes: self.disclaimer.clone(),
        }
    }

    /// The entry appended to the patient's document for this cycle.
    pub fn document_entry(
        &self,
        symptoms: &SymptomSet,
        classical: &ClassicalOutcome,
        sequence: &SequenceOutcome,
        report: &Report,
    ) -> Value {
        json!({
            "symptoms": symptoms,
            "classical_prediction": classical.as_ref().ok().map(|c| c.label.as_str()),
            "sequence_prediction": sequence.as_ref().ok(),
            "structured_report": report,
        })
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::from_settings(&ReportSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use healix_contracts::prediction::{
        ClassicalPrediction, PredictionScores, SequencePrediction, Unavailable, UnavailableReason,
    };

    use super::*;

    fn reconciled() -> ReconciledPrediction {
        let mut scores = PredictionScores::new();
        scores.insert("Influenza", 100.0);
        ReconciledPrediction {
            scores,
            primary: Some("Influenza".into()),
            confidence: None,
            summary: "Based on your symptoms, the classical model suggests: Influenza.".into(),
        }
    }

    #[test]
    fn report_carries_snapshot_symptoms_and_scores() {
        let assembler = ReportAssembler::default();
        let demographics = Demographics {
            name: Some("Alice".into()),
            age: Some("29".into()),
            gender: Some("female".into()),
        };
        let symptoms: SymptomSet = ["fever", "cough"].into_iter().collect();

        let report = assembler.assemble(&demographics, &symptoms, &reconciled());

        assert!(report.report_id.0.starts_with("rep_"));
        assert_eq!(report.patient.name, "Alice");
        assert_eq!(report.symptoms, symptoms);
        assert_eq!(report.predictions.get("Influenza"), Some(100.0));
        assert_eq!(report.recommended_doctors.len(), 2);
        assert!(report.notes.contains("not a medical diagnosis"));
    }

    #[test]
    fn document_entry_records_both_models() {
        let assembler = ReportAssembler::default();
        let symptoms: SymptomSet = ["fever"].into_iter().collect();
        let report = assembler.assemble(&Demographics::default(), &symptoms, &reconciled());

        let classical: ClassicalOutcome = Ok(ClassicalPrediction { label: "Influenza".into() });
        let sequence: SequenceOutcome =
            Ok(SequencePrediction { class_index: 2, confidence: 0.75, label: None });
        let entry = assembler.document_entry(&symptoms, &classical, &sequence, &report);

        assert_eq!(entry["symptoms"], json!(["fever"]));
        assert_eq!(entry["classical_prediction"], "Influenza");
        assert_eq!(entry["sequence_prediction"]["class_index"], 2);
        assert_eq!(entry["structured_report"]["report_id"], json!(report.report_id.0));

        let missing: SequenceOutcome =
            Err(Unavailable::new(UnavailableReason::ModelMissing, ""));
        let entry = assembler.document_entry(&symptoms, &classical, &missing, &report);
        assert!(entry["sequence_prediction"].is_null());
    }
}
