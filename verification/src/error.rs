use thiserror::Error;

/// Image capture failed. Always transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera is not available")]
    Unavailable,

    #[error("capture failed: {0}")]
    Failed(String),
}

/// The OCR collaborator itself failed, as opposed to reporting an unreadable
/// document (which is a [`crate::RawOcrExtraction::Failed`] value).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OcrError {
    #[error("OCR engine failure: {0}")]
    Engine(String),
}

/// The remote cross-check did not produce a structured verdict.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("verification timed out")]
    Timeout,

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Why an attempt could not produce a verdict.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("a verification attempt is already in flight")]
    AlreadyInProgress,
}
