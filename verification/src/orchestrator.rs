//! Verification orchestrator: capture, local age gate, remote cross-check,
//! outcome classification.
//!
//! At most one attempt is in flight. [`VerificationOrchestrator::begin`]
//! claims the capture guard and hands back an [`InFlightAttempt`] whose
//! `Drop` releases it, so the guard is cleared on every exit: normal return,
//! early return, panic, or the attempt future being dropped on cancellation.

use crate::age_gate::{AgeGate, OcrResult};
use crate::collaborators::{ImageCapture, ImageHandle, OcrExtractor, RemoteVerifier};
use crate::error::{RemoteError, VerificationError};
use crate::outcomes::{VerificationOutcome, UNAVAILABLE_MESSAGE};
use ageproof_types::Clock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Monotonically increasing id of one orchestration run.
pub type AttemptId = u64;

/// The collaborators an orchestrator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub capture: Arc<dyn ImageCapture>,
    pub ocr: Arc<dyn OcrExtractor>,
    pub remote: Arc<dyn RemoteVerifier>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone, Copy, Debug)]
pub struct OrchestratorConfig {
    pub minimum_age: u32,
    pub accept_medium_confidence: bool,
    /// Optional cap on the cross-check; `None` leaves it to the collaborator.
    pub remote_timeout: Option<Duration>,
}

impl OrchestratorConfig {
    pub fn new(minimum_age: u32) -> Self {
        Self {
            minimum_age,
            accept_medium_confidence: true,
            remote_timeout: None,
        }
    }
}

/// Proof that the capture guard is held. Releases it on drop.
#[derive(Debug)]
pub struct InFlightAttempt {
    id: AttemptId,
    guard: Arc<AtomicBool>,
}

impl InFlightAttempt {
    pub fn id(&self) -> AttemptId {
        self.id
    }
}

impl Drop for InFlightAttempt {
    fn drop(&mut self) {
        self.guard.store(false, Ordering::Release);
    }
}

/// Image and local OCR result kept after a transient remote failure, so a
/// retry can go straight to the cross-check.
#[derive(Debug)]
pub struct RetainedEvidence {
    pub image: ImageHandle,
    pub ocr: OcrResult,
}

/// Everything one finished attempt produced.
#[derive(Debug)]
pub struct AttemptReport {
    pub attempt_id: AttemptId,
    pub outcome: VerificationOutcome,
    /// The local gate's result, when OCR ran.
    pub ocr: Option<OcrResult>,
    /// Handed to the caller on approval only.
    pub image: Option<ImageHandle>,
    /// Set after a transient remote failure.
    pub retained: Option<RetainedEvidence>,
    /// Capture itself failed; the liveness proof is spent.
    pub capture_failed: bool,
}

impl AttemptReport {
    fn new(attempt_id: AttemptId, outcome: VerificationOutcome) -> Self {
        Self {
            attempt_id,
            outcome,
            ocr: None,
            image: None,
            retained: None,
            capture_failed: false,
        }
    }

    /// A transient report for an attempt that never returned normally.
    pub fn aborted(attempt_id: AttemptId) -> Self {
        Self::new(attempt_id, VerificationOutcome::transient(UNAVAILABLE_MESSAGE))
    }
}

pub struct VerificationOrchestrator {
    collaborators: Collaborators,
    gate: AgeGate,
    remote_timeout: Option<Duration>,
    in_flight: Arc<AtomicBool>,
    next_attempt: AtomicU64,
}

impl VerificationOrchestrator {
    pub fn new(collaborators: Collaborators, config: OrchestratorConfig) -> Self {
        Self {
            collaborators,
            gate: AgeGate::new(config.minimum_age)
                .with_medium_confidence(config.accept_medium_confidence),
            remote_timeout: config.remote_timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
            next_attempt: AtomicU64::new(1),
        }
    }

    /// Claim the capture guard. `None` if an attempt is already in flight;
    /// re-entry is a no-op, not an error.
    pub fn begin(&self) -> Option<InFlightAttempt> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("verification already in flight, ignoring re-entry");
            return None;
        }
        let id = self.next_attempt.fetch_add(1, Ordering::Relaxed);
        Some(InFlightAttempt {
            id,
            guard: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn minimum_age(&self) -> u32 {
        self.gate.minimum_age()
    }

    /// Claim the guard and run a full attempt.
    pub async fn run(&self) -> Result<AttemptReport, VerificationError> {
        let attempt = self.begin().ok_or(VerificationError::AlreadyInProgress)?;
        Ok(self.execute(attempt).await)
    }

    /// Run a full attempt: capture, local gate, cross-check.
    pub async fn execute(&self, attempt: InFlightAttempt) -> AttemptReport {
        let id = attempt.id();

        let image = match self.collaborators.capture.capture().await {
            Ok(image) => image,
            Err(e) => {
                warn!(attempt = id, error = %e, "document capture failed");
                let mut report = AttemptReport::new(id, VerificationOutcome::from_error(&e.into()));
                report.capture_failed = true;
                return report;
            }
        };

        let raw = match self
            .collaborators
            .ocr
            .extract(&image, self.gate.minimum_age())
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(attempt = id, error = %e, "OCR collaborator failed");
                return AttemptReport::new(id, VerificationOutcome::from_error(&e.into()));
            }
        };

        let today = self.collaborators.clock.now().date();
        let ocr = self.gate.evaluate(&raw, today);

        if !ocr.success {
            debug!(attempt = id, failure = ?ocr.failure, "local gate could not read document");
            let outcome = VerificationOutcome::retake_recommended(&ocr);
            return AttemptReport {
                ocr: Some(ocr),
                ..AttemptReport::new(id, outcome)
            };
        }
        if !ocr.meets_age_requirement {
            debug!(attempt = id, age = ?ocr.age_years, "local gate rejected age");
            let outcome = VerificationOutcome::local_age_rejected(&ocr);
            return AttemptReport {
                ocr: Some(ocr),
                ..AttemptReport::new(id, outcome)
            };
        }

        let report = self.cross_check(id, image, ocr).await;
        drop(attempt);
        report
    }

    /// Re-run only the cross-check with evidence from an earlier transient
    /// failure.
    pub async fn resume(&self, attempt: InFlightAttempt, evidence: RetainedEvidence) -> AttemptReport {
        let report = self.cross_check(attempt.id(), evidence.image, evidence.ocr).await;
        drop(attempt);
        report
    }

    async fn cross_check(&self, id: AttemptId, image: ImageHandle, ocr: OcrResult) -> AttemptReport {
        let Some(fields) = ocr.local_fields() else {
            // Unreachable through execute(): the gate only passes successful readings.
            return AttemptReport {
                ocr: Some(ocr),
                ..AttemptReport::new(id, VerificationOutcome::transient(UNAVAILABLE_MESSAGE))
            };
        };

        let call = self.collaborators.remote.verify(&image, &fields);
        let result = match self.remote_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(RemoteError::Timeout)),
            None => call.await,
        };

        match result {
            Ok(verdict) => {
                let outcome = VerificationOutcome::from_remote(verdict);
                info!(
                    attempt = id,
                    kind = ?outcome.kind,
                    audit_id = outcome.audit_id.as_deref().unwrap_or("-"),
                    "verification finished"
                );
                let image = outcome.kind.is_approved().then_some(image);
                AttemptReport {
                    ocr: Some(ocr),
                    image,
                    ..AttemptReport::new(id, outcome)
                }
            }
            Err(e) => {
                warn!(attempt = id, error = %e, "remote cross-check failed");
                let outcome = VerificationOutcome::from_error(&e.into());
                AttemptReport {
                    ocr: Some(ocr.clone()),
                    retained: Some(RetainedEvidence { image, ocr }),
                    ..AttemptReport::new(id, outcome)
                }
            }
        }
    }
}
