//! The intake pipeline: one inbound message in, one `ChatResponse` out.
//!
//!   Session → Slot-fill | Extract → Classical + Sequence → Reconcile → Assemble → Persist
//!
//! The patient always receives a reply. Model availability changes the
//! content of that reply, never its presence: predictor failures are
//! `Unavailable` values, and persistence failures are logged and skipped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use healix_contracts::{
    conversation::{Demographics, SessionId},
    error::HealixResult,
    prediction::{ClassicalOutcome, SequenceOutcome},
    report::{ChatResponse, DocumentHandle, PatientSnapshot, Report},
    symptom::SymptomSet,
};

use crate::{
    adapters::{ClassicalAdapter, SequenceAdapter},
    assembler::ReportAssembler,
    conversation::Turn,
    reconcile::reconcile,
    sessions::SessionRegistry,
    traits::{DocumentWriter, ReportStore, SymptomExtractor},
};

/// Reply when a symptom message yields nothing to predict from.
pub const ELABORATE_REPLY: &str =
    "I couldn't reliably extract symptoms from that. Please describe your symptoms with more detail.";

/// Drives every inbound message through the conversation and prediction stages.
///
/// Construct one pipeline per process; it is safe to share across threads.
pub struct IntakePipeline {
    extractor: Box<dyn SymptomExtractor>,
    classical: ClassicalAdapter,
    sequence: SequenceAdapter,
    assembler: ReportAssembler,
    reports: Arc<dyn ReportStore>,
    documents: Arc<dyn DocumentWriter>,
    sessions: SessionRegistry,
}

impl IntakePipeline {
    pub fn new(
        extractor: Box<dyn SymptomExtractor>,
        classical: ClassicalAdapter,
        sequence: SequenceAdapter,
        assembler: ReportAssembler,
        reports: Arc<dyn ReportStore>,
        documents: Arc<dyn DocumentWriter>,
    ) -> Self {
        info!(
            extractor = extractor.name(),
            classical = classical.is_available(),
            sequence = sequence.is_available(),
            "intake pipeline ready"
        );
        Self {
            extractor,
            classical,
            sequence,
            assembler,
            reports,
            documents,
            sessions: SessionRegistry::new(),
        }
    }

    /// Forget conversations idle longer than `idle_timeout`.
    pub fn with_session_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.sessions = SessionRegistry::with_idle_timeout(idle_timeout);
        self
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Handle one message for `session`.
    ///
    /// # Errors
    ///
    /// Only a poisoned session registry is an error. Missing models, empty
    /// extractions and storage failures all still produce a reply.
    pub fn handle_message(&self, session: &SessionId, text: &str) -> HealixResult<ChatResponse> {
        // ── Stage 1: Slot filling ────────────────────────────────────────────
        let (turn, demographics, document) = self.sessions.with_session(session, |c| {
            let turn = c.advance(text);
            (turn, c.demographics().clone(), c.document().cloned())
        })?;

        if let Turn::Prompt { reply, demographics_completed } = turn {
            debug!(session = %session, "demographic slot turn");
            if demographics_completed {
                self.open_document(session, &demographics)?;
            }
            return Ok(ChatResponse::prompt(reply));
        }

        // ── Stage 2: Extraction ──────────────────────────────────────────────
        let symptoms = self.extractor.extract(text);
        if symptoms.is_empty() {
            info!(session = %session, extractor = self.extractor.name(), "no symptoms extracted");
            return Ok(ChatResponse::prompt(ELABORATE_REPLY));
        }
        debug!(session = %session, symptoms = ?symptoms.as_slice(), "symptoms extracted");

        // ── Stage 3: Prediction ──────────────────────────────────────────────
        let classical = self.classical.predict(&symptoms);
        if let Err(u) = &classical {
            debug!(session = %session, reason = %u, "classical adapter unavailable");
        }
        let sequence = self.sequence.predict(&symptoms);
        if let Err(u) = &sequence {
            debug!(session = %session, reason = %u, "sequence adapter unavailable");
        }

        // ── Stage 4: Reconciliation + report ─────────────────────────────────
        let reconciled = reconcile(&classical, &sequence);
        let report = self.assembler.assemble(&demographics, &symptoms, &reconciled);

        // ── Stage 5: Persistence (best effort) ───────────────────────────────
        self.persist(session, &demographics, document, &symptoms, &classical, &sequence, &report)?;

        info!(
            session = %session,
            report_id = %report.report_id.0,
            primary = reconciled.primary.as_deref().unwrap_or("none"),
            "prediction cycle complete"
        );

        Ok(ChatResponse {
            reply: reconciled.summary,
            extracted_symptoms: symptoms,
            primary_prediction: reconciled.primary,
            confidence: reconciled.confidence,
            report: Some(report),
        })
    }

    /// Create the patient's document and attach its handle to the session.
    ///
    /// Returns the handle, or `None` if the writer failed.
    fn open_document(
        &self,
        session: &SessionId,
        demographics: &Demographics,
    ) -> HealixResult<Option<DocumentHandle>> {
        let patient = PatientSnapshot::from_demographics(demographics);
        match self.documents.create(&patient) {
            Ok(handle) => {
                debug!(session = %session, path = %handle.path.display(), "patient document created");
                let attached = handle.clone();
                self.sessions.with_session(session, move |c| c.attach_document(attached))?;
                Ok(Some(handle))
            }
            Err(e) => {
                warn!(session = %session, error = %e, "could not create patient document");
                Ok(None)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn persist(
        &self,
        session: &SessionId,
        demographics: &Demographics,
        document: Option<DocumentHandle>,
        symptoms: &SymptomSet,
        classical: &ClassicalOutcome,
        sequence: &SequenceOutcome,
        report: &Report,
    ) -> HealixResult<()> {
        let document = match document {
            Some(handle) => Some(handle),
            None => self.open_document(session, demographics)?,
        };
        if let Some(handle) = document {
            let entry = self.assembler.document_entry(symptoms, classical, sequence, report);
            if let Err(e) = self.documents.append(&handle, &entry) {
                warn!(session = %session, error = %e, "could not append to patient document");
            }
        }

        if let Err(e) = self.reports.append(report) {
            warn!(
                session = %session,
                report_id = %report.report_id.0,
                error = %e,
                "could not persist report"
            );
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
