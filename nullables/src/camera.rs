//! Nullable camera: scripted captures.

use ageproof_verification::{CaptureError, ImageCapture, ImageHandle};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A camera that returns queued failures, then fresh image handles.
pub struct NullCamera {
    failures: Mutex<VecDeque<CaptureError>>,
    calls: AtomicUsize,
}

impl NullCamera {
    pub fn new() -> Self {
        Self {
            failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next capture with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: CaptureError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NullCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageCapture for NullCamera {
    async fn capture(&self) -> Result<ImageHandle, CaptureError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(ImageHandle::new(format!("null://capture/{n}")))
    }
}
