//! Narrow interfaces to the camera, OCR engine and remote verification
//! service.
//!
//! Implementations live with the host application (or in the nullables crate
//! for tests). The orchestrator holds them as `Arc<dyn Trait>` so one attempt
//! can run on a spawned task while the flow keeps consuming frames.

use crate::age_gate::RawOcrExtraction;
use crate::error::{CaptureError, OcrError, RemoteError};
use ageproof_types::{ConfidenceLevel, Recommendation, RiskLevel};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque reference to a captured still image.
///
/// Deliberately not `Clone`: exactly one owner holds it at a time.
#[derive(Debug, PartialEq, Eq)]
pub struct ImageHandle {
    uri: String,
}

impl ImageHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Still-image capture. Called at most once concurrently.
#[async_trait]
pub trait ImageCapture: Send + Sync {
    async fn capture(&self) -> Result<ImageHandle, CaptureError>;
}

/// Reads the date of birth off a document image.
///
/// Unreadable documents are reported in the returned extraction, not as `Err`.
/// `Err` is reserved for the engine itself breaking.
#[async_trait]
pub trait OcrExtractor: Send + Sync {
    async fn extract(
        &self,
        image: &ImageHandle,
        minimum_age: u32,
    ) -> Result<RawOcrExtraction, OcrError>;
}

/// Remote age re-verification and fraud assessment.
///
/// The future may be dropped mid-flight when the user leaves the screen.
#[async_trait]
pub trait RemoteVerifier: Send + Sync {
    async fn verify(
        &self,
        image: &ImageHandle,
        fields: &LocalOcrFields,
    ) -> Result<RemoteVerdict, RemoteError>;
}

/// What the local gate learned, sent alongside the image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOcrFields {
    pub age_years: u32,
    pub date_of_birth: NaiveDate,
    pub confidence: ConfidenceLevel,
    pub minimum_age: u32,
}

/// Structured answer from the remote service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteVerdict {
    /// Whether the service considers the age requirement met.
    pub verified: bool,
    pub audit_id: Option<String>,
    /// Age as independently extracted by the service.
    pub extracted_age: Option<u32>,
    /// Explanation when the service disagrees with the local reading.
    pub discrepancy_note: Option<String>,
    pub confidence_level: Option<ConfidenceLevel>,
    /// The service's age disagrees with the local one.
    pub age_mismatch: bool,
    pub fraud: Option<FraudAssessment>,
}

/// Fraud portion of a remote verdict.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FraudAssessment {
    pub detected: bool,
    pub risk_level: Option<RiskLevel>,
    pub recommendation: Option<Recommendation>,
    /// Detection internals. Never forwarded past the orchestrator.
    pub diagnostics: Vec<String>,
}

impl RemoteVerdict {
    /// A clean approval with the given audit id.
    pub fn approved(audit_id: impl Into<String>) -> Self {
        Self {
            verified: true,
            audit_id: Some(audit_id.into()),
            ..Self::default()
        }
    }

    /// The recommendation carried by the fraud assessment, if any.
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.fraud.as_ref().and_then(|f| f.recommendation)
    }
}
