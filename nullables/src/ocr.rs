//! Nullable OCR: returns a fixed extraction.

use ageproof_types::ConfidenceLevel;
use ageproof_verification::{
    ExtractionFailure, ImageHandle, OcrError, OcrExtractor, RawOcrExtraction,
};
use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// An OCR engine whose answer is set by the test.
pub struct NullOcr {
    response: Mutex<Result<RawOcrExtraction, OcrError>>,
    calls: AtomicUsize,
}

impl NullOcr {
    fn with(response: Result<RawOcrExtraction, OcrError>) -> Self {
        Self {
            response: Mutex::new(response),
            calls: AtomicUsize::new(0),
        }
    }

    /// Reads `date_of_birth` with high confidence.
    pub fn extracting(date_of_birth: NaiveDate) -> Self {
        Self::with(Ok(RawOcrExtraction::Extracted {
            date_of_birth,
            confidence: ConfidenceLevel::High,
        }))
    }

    /// Reads a date of birth exactly `years` before `today`.
    pub fn aged(years: u32, today: NaiveDate) -> Self {
        let date_of_birth = today
            .checked_sub_months(Months::new(years * 12))
            .unwrap_or(NaiveDate::MIN);
        Self::extracting(date_of_birth)
    }

    /// Reports the document as unusable.
    pub fn failing(failure: ExtractionFailure) -> Self {
        Self::with(Ok(RawOcrExtraction::Failed(failure)))
    }

    /// The engine itself errors.
    pub fn broken(reason: &str) -> Self {
        Self::with(Err(OcrError::Engine(reason.to_string())))
    }

    /// Change the answer for subsequent calls.
    pub fn respond_with(&self, response: Result<RawOcrExtraction, OcrError>) {
        *self.response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrExtractor for NullOcr {
    async fn extract(
        &self,
        _image: &ImageHandle,
        _minimum_age: u32,
    ) -> Result<RawOcrExtraction, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().unwrap().clone()
    }
}
