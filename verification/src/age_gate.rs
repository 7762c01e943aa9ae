//! Document age gate: the local, network-free decision.
//!
//! Takes whatever the OCR collaborator extracted and decides whether the
//! document holder meets the minimum age. Unreadable documents come back as a
//! failed [`OcrResult`]; no age is ever made up.

use crate::collaborators::LocalOcrFields;
use ageproof_types::ConfidenceLevel;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Oldest age accepted as a real reading.
pub const MAX_PLAUSIBLE_AGE: u32 = 150;

/// Why a document could not be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionFailure {
    /// Text could not be read at all (blur, glare, wrong document).
    Unreadable,
    /// Text was read but no date of birth was found.
    NoDateFound,
    /// A date was found but the reading is not trustworthy.
    LowConfidence,
    /// The date is in the future or implies an impossible age.
    ImplausibleDate,
}

impl ExtractionFailure {
    /// User-facing description of the failure class.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unreadable => "document unreadable, please retake the photo",
            Self::NoDateFound => "no date of birth found on the document",
            Self::LowConfidence => "low confidence reading, please retake in better light",
            Self::ImplausibleDate => "implausible date of birth, please retake the photo",
        }
    }
}

/// Raw output of the OCR collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawOcrExtraction {
    Extracted {
        date_of_birth: NaiveDate,
        confidence: ConfidenceLevel,
    },
    Failed(ExtractionFailure),
}

/// Result of the local age gate for one captured document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrResult {
    pub success: bool,
    pub age_years: Option<u32>,
    pub meets_age_requirement: bool,
    pub error_message: Option<String>,
    pub failure: Option<ExtractionFailure>,
    pub date_of_birth: Option<NaiveDate>,
    pub confidence: Option<ConfidenceLevel>,
    pub minimum_age: u32,
}

impl OcrResult {
    fn failed(failure: ExtractionFailure, minimum_age: u32) -> Self {
        Self {
            success: false,
            age_years: None,
            meets_age_requirement: false,
            error_message: Some(failure.message().to_string()),
            failure: Some(failure),
            date_of_birth: None,
            confidence: None,
            minimum_age,
        }
    }

    /// Fields forwarded to the remote cross-check. `None` unless extraction
    /// succeeded.
    pub fn local_fields(&self) -> Option<LocalOcrFields> {
        Some(LocalOcrFields {
            age_years: self.age_years?,
            date_of_birth: self.date_of_birth?,
            confidence: self.confidence?,
            minimum_age: self.minimum_age,
        })
    }
}

/// Whole years from `date_of_birth` to `today`. `None` if born after today.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if date_of_birth > today {
        return None;
    }
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// The local minimum-age decision.
#[derive(Clone, Copy, Debug)]
pub struct AgeGate {
    minimum_age: u32,
    accept_medium_confidence: bool,
}

impl AgeGate {
    pub fn new(minimum_age: u32) -> Self {
        Self {
            minimum_age,
            accept_medium_confidence: true,
        }
    }

    /// Whether a MEDIUM-confidence reading may pass. LOW never does.
    pub fn with_medium_confidence(mut self, accept: bool) -> Self {
        self.accept_medium_confidence = accept;
        self
    }

    pub fn minimum_age(&self) -> u32 {
        self.minimum_age
    }

    /// Decide against an explicit "today".
    pub fn evaluate(&self, raw: &RawOcrExtraction, today: NaiveDate) -> OcrResult {
        let (date_of_birth, confidence) = match *raw {
            RawOcrExtraction::Failed(failure) => {
                return OcrResult::failed(failure, self.minimum_age)
            }
            RawOcrExtraction::Extracted {
                date_of_birth,
                confidence,
            } => (date_of_birth, confidence),
        };

        let trusted = match confidence {
            ConfidenceLevel::High => true,
            ConfidenceLevel::Medium => self.accept_medium_confidence,
            ConfidenceLevel::Low => false,
        };
        if !trusted {
            return OcrResult::failed(ExtractionFailure::LowConfidence, self.minimum_age);
        }

        let age = match age_in_years(date_of_birth, today) {
            Some(age) if age <= MAX_PLAUSIBLE_AGE => age,
            _ => return OcrResult::failed(ExtractionFailure::ImplausibleDate, self.minimum_age),
        };

        OcrResult {
            success: true,
            age_years: Some(age),
            meets_age_requirement: age >= self.minimum_age,
            error_message: None,
            failure: None,
            date_of_birth: Some(date_of_birth),
            confidence: Some(confidence),
            minimum_age: self.minimum_age,
        }
    }
}

/// Decide against today's UTC date with the default confidence policy.
pub fn evaluate(raw: &RawOcrExtraction, minimum_age: u32) -> OcrResult {
    AgeGate::new(minimum_age).evaluate(raw, Utc::now().date_naive())
}
