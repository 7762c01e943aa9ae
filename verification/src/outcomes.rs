//! Verification outcomes: what one orchestration attempt ended with.
//!
//! Local paths (capture failure, unreadable document, too young) are built
//! from local facts only. Remote verdicts are classified in a fixed order:
//! fraud first, then age, then advisories, then plain approval.
//!
//! Fraud rejections forward only the audit id, risk level and recommendation;
//! the service's diagnostics stay behind.

use crate::age_gate::OcrResult;
use crate::collaborators::RemoteVerdict;
use crate::error::{RemoteError, VerificationError};
use ageproof_types::{ConfidenceLevel, Recommendation, RiskLevel};
use serde::{Deserialize, Serialize};

/// Terminal outcome of one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Approved,
    /// Approved, but the service flagged the attempt for review.
    ApprovedWithReview,
    /// Approved, but the service suggested a better photo next time.
    ApprovedWithRetakeAdvisory,
    AgeRejected,
    FraudRejected,
    /// The document could not be used; nothing was sent to the service.
    RetakeRecommended,
    /// Camera or network hiccup; retry permitted.
    TransientError,
}

/// Error-handling taxonomy the presentation layer keys its views on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeCategory {
    Success,
    Advisory,
    TransientError,
    ValidationError,
    AgeRejected,
    FraudRejected,
}

impl OutcomeKind {
    pub fn category(&self) -> OutcomeCategory {
        match self {
            Self::Approved => OutcomeCategory::Success,
            Self::ApprovedWithReview | Self::ApprovedWithRetakeAdvisory => {
                OutcomeCategory::Advisory
            }
            Self::AgeRejected => OutcomeCategory::AgeRejected,
            Self::FraudRejected => OutcomeCategory::FraudRejected,
            Self::RetakeRecommended => OutcomeCategory::ValidationError,
            Self::TransientError => OutcomeCategory::TransientError,
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::ApprovedWithReview | Self::ApprovedWithRetakeAdvisory
        )
    }

    /// Whether the dedicated rejection view (retry / exit) applies.
    pub fn offers_rejection_view(&self) -> bool {
        matches!(self, Self::AgeRejected | Self::FraudRejected)
    }
}

/// Fraud fields safe to show past the orchestrator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudSummary {
    pub detected: bool,
    pub risk_level: Option<RiskLevel>,
    pub recommendation: Option<Recommendation>,
}

/// Read-only result of a completed attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub kind: OutcomeKind,
    pub verified: bool,
    pub audit_id: Option<String>,
    /// Age as extracted by the remote service. Never the local reading.
    pub extracted_age: Option<u32>,
    pub discrepancy_note: Option<String>,
    pub confidence_level: Option<ConfidenceLevel>,
    pub fraud: FraudSummary,
    /// User-facing explanation for non-approved outcomes and advisories.
    pub message: Option<String>,
}

pub const TIMEOUT_MESSAGE: &str = "verification timed out, please retry";
pub const UNAVAILABLE_MESSAGE: &str = "verification service unavailable, please retry";
pub const CAPTURE_FAILED_MESSAGE: &str = "could not capture the document, please try again";
pub const REVIEW_ADVISORY: &str = "your verification has been flagged for manual review";
pub const RETAKE_ADVISORY: &str = "verified, but a clearer photo is recommended next time";

impl VerificationOutcome {
    fn bare(kind: OutcomeKind, message: Option<String>) -> Self {
        Self {
            kind,
            verified: kind.is_approved(),
            audit_id: None,
            extracted_age: None,
            discrepancy_note: None,
            confidence_level: None,
            fraud: FraudSummary::default(),
            message,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::bare(OutcomeKind::TransientError, Some(message.into()))
    }

    /// Transient outcome for a collaborator that failed to answer.
    pub fn from_error(error: &VerificationError) -> Self {
        let message = match error {
            VerificationError::Capture(_) => CAPTURE_FAILED_MESSAGE,
            VerificationError::Remote(RemoteError::Timeout) => TIMEOUT_MESSAGE,
            _ => UNAVAILABLE_MESSAGE,
        };
        Self::transient(message)
    }

    /// The local gate could not read the document.
    pub fn retake_recommended(ocr: &OcrResult) -> Self {
        Self::bare(OutcomeKind::RetakeRecommended, ocr.error_message.clone())
    }

    /// The local gate read an age below the minimum. No remote call was made,
    /// so every remote-sourced field stays empty.
    pub fn local_age_rejected(ocr: &OcrResult) -> Self {
        Self::bare(
            OutcomeKind::AgeRejected,
            Some(format!(
                "the minimum age of {} is not met",
                ocr.minimum_age
            )),
        )
    }

    /// Classify a structured remote verdict.
    pub fn from_remote(verdict: RemoteVerdict) -> Self {
        let fraud = verdict.fraud.as_ref().map(|f| FraudSummary {
            detected: f.detected,
            risk_level: f.risk_level,
            recommendation: f.recommendation,
        });
        let recommendation = verdict.recommendation();

        if fraud.as_ref().is_some_and(|f| f.detected)
            || recommendation == Some(Recommendation::Reject)
        {
            return Self {
                audit_id: verdict.audit_id,
                fraud: fraud.unwrap_or_default(),
                ..Self::bare(
                    OutcomeKind::FraudRejected,
                    Some("verification could not be completed".to_string()),
                )
            };
        }

        let kind = if !verdict.verified || verdict.age_mismatch {
            OutcomeKind::AgeRejected
        } else {
            match recommendation {
                Some(Recommendation::Review) => OutcomeKind::ApprovedWithReview,
                Some(Recommendation::RetakePhoto) => OutcomeKind::ApprovedWithRetakeAdvisory,
                _ => OutcomeKind::Approved,
            }
        };
        let message = match kind {
            OutcomeKind::AgeRejected => Some(
                verdict
                    .discrepancy_note
                    .clone()
                    .unwrap_or_else(|| "the minimum age requirement is not met".to_string()),
            ),
            OutcomeKind::ApprovedWithReview => Some(REVIEW_ADVISORY.to_string()),
            OutcomeKind::ApprovedWithRetakeAdvisory => Some(RETAKE_ADVISORY.to_string()),
            _ => None,
        };

        Self {
            kind,
            verified: kind.is_approved(),
            audit_id: verdict.audit_id,
            extracted_age: verdict.extracted_age,
            discrepancy_note: verdict.discrepancy_note,
            confidence_level: verdict.confidence_level,
            fraud: fraud.unwrap_or_default(),
            message,
        }
    }

    /// Non-blocking notice to show alongside success.
    pub fn advisory(&self) -> Option<&str> {
        match self.kind.category() {
            OutcomeCategory::Advisory => self.message.as_deref(),
            _ => None,
        }
    }
}
