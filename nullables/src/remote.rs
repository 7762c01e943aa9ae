//! Nullable remote verifier: scripted verdicts, optional stall.

use ageproof_verification::{
    ImageHandle, LocalOcrFields, RemoteError, RemoteVerdict, RemoteVerifier,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// A remote verifier that answers from a queue.
///
/// When the queue is empty it approves with audit id `"null-audit"`. While
/// stalled, calls park until [`NullRemoteVerifier::release`].
pub struct NullRemoteVerifier {
    responses: Mutex<VecDeque<Result<RemoteVerdict, RemoteError>>>,
    received: Mutex<Vec<LocalOcrFields>>,
    calls: AtomicUsize,
    stalled: AtomicBool,
    released: Notify,
    entered: Notify,
}

impl NullRemoteVerifier {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            stalled: AtomicBool::new(false),
            released: Notify::new(),
            entered: Notify::new(),
        }
    }

    /// Queue the answer for a future call.
    pub fn respond_with(&self, response: Result<RemoteVerdict, RemoteError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Park every call until [`release`](Self::release).
    pub fn stall(&self) {
        self.stalled.store(true, Ordering::SeqCst);
    }

    /// Let parked and future calls through.
    pub fn release(&self) {
        self.stalled.store(false, Ordering::SeqCst);
        self.released.notify_waiters();
    }

    /// Wait until a call has reached the verifier.
    pub async fn wait_for_call(&self) {
        loop {
            let entered = self.entered.notified();
            if self.calls() > 0 {
                return;
            }
            entered.await;
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The local fields each call was sent.
    pub fn received(&self) -> Vec<LocalOcrFields> {
        self.received.lock().unwrap().clone()
    }
}

impl Default for NullRemoteVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteVerifier for NullRemoteVerifier {
    async fn verify(
        &self,
        _image: &ImageHandle,
        fields: &LocalOcrFields,
    ) -> Result<RemoteVerdict, RemoteError> {
        self.received.lock().unwrap().push(fields.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_waiters();

        loop {
            let released = self.released.notified();
            if !self.stalled.load(Ordering::SeqCst) {
                break;
            }
            released.await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RemoteVerdict::approved("null-audit")))
    }
}
