//! Per-attempt state owned by the flow's consumer.

use crate::age_gate::OcrResult;
use crate::orchestrator::{AttemptId, AttemptReport, RetainedEvidence};
use crate::outcomes::VerificationOutcome;

/// Everything one verification attempt produced or is still holding.
///
/// Only the single consumer mutates this; a finished attempt's report is
/// applied only while its id is still the active one.
#[derive(Debug, Default)]
pub struct AttemptState {
    /// The attempt whose result will be accepted, if one is running.
    pub active_attempt: Option<AttemptId>,
    pub ocr: Option<OcrResult>,
    pub outcome: Option<VerificationOutcome>,
    /// Image and OCR kept after a transient remote failure.
    pub retained: Option<RetainedEvidence>,
}

impl AttemptState {
    /// Mark `id` as the attempt whose result will be accepted.
    pub fn begin(&mut self, id: AttemptId) {
        self.active_attempt = Some(id);
        self.outcome = None;
    }

    /// Apply a finished attempt if it is still the active one.
    ///
    /// Returns the report back when it is stale so the caller can drop it
    /// explicitly.
    pub fn apply(&mut self, mut report: AttemptReport) -> Result<AttemptReport, AttemptReport> {
        if self.active_attempt != Some(report.attempt_id) {
            return Err(report);
        }
        self.active_attempt = None;
        self.retained = report.retained.take();
        self.ocr = report.ocr.clone();
        self.outcome = Some(report.outcome.clone());
        Ok(report)
    }

    pub fn is_clear(&self) -> bool {
        self.active_attempt.is_none()
            && self.ocr.is_none()
            && self.outcome.is_none()
            && self.retained.is_none()
    }

    /// Discard everything. Returns the attempt that was running, if any.
    pub fn clear(&mut self) -> Option<AttemptId> {
        let cancelled = self.active_attempt.take();
        self.ocr = None;
        self.outcome = None;
        self.retained = None;
        cancelled
    }
}
