//! Identity verification protocol.
//!
//! Runs after liveness passes:
//! 1. **Capture**: take a still of the ID document.
//! 2. **Local gate**: OCR the date of birth and check the minimum age on-device.
//! 3. **Cross-check**: ask the remote service to re-verify age and assess fraud.
//! 4. **Outcome**: approved, approved with an advisory, rejected, or retry.
//!
//! Camera, OCR and the remote service are collaborators behind the traits in
//! [`collaborators`]; this crate never depends on a concrete SDK.

pub mod age_gate;
pub mod collaborators;
pub mod error;
pub mod orchestrator;
pub mod outcomes;
pub mod presentation;
pub mod retry;
pub mod state;

pub use age_gate::{AgeGate, ExtractionFailure, OcrResult, RawOcrExtraction};
pub use collaborators::{
    FraudAssessment, ImageCapture, ImageHandle, LocalOcrFields, OcrExtractor, RemoteVerdict,
    RemoteVerifier,
};
pub use error::{CaptureError, OcrError, RemoteError, VerificationError};
pub use orchestrator::{
    AttemptId, AttemptReport, Collaborators, InFlightAttempt, OrchestratorConfig,
    RetainedEvidence, VerificationOrchestrator,
};
pub use outcomes::{FraudSummary, OutcomeCategory, OutcomeKind, VerificationOutcome};
pub use presentation::{HapticCue, PresentationEvent, PresentationSink};
pub use retry::{RetryAction, RetryController};
pub use state::AttemptState;
