//! Recording presentation sink: captures events instead of rendering them.

use ageproof_verification::{PresentationEvent, PresentationSink, VerificationOutcome};
use std::sync::Mutex;
use tokio::sync::Notify;

/// A presentation layer that records every event it is sent.
pub struct RecordingSink {
    events: Mutex<Vec<PresentationEvent>>,
    published: Notify,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            published: Notify::new(),
        }
    }

    /// Run `f` over the recorded events.
    pub fn inspect<R>(&self, f: impl FnOnce(&[PresentationEvent]) -> R) -> R {
        f(&self.events.lock().unwrap())
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&PresentationEvent) -> bool) -> usize {
        self.inspect(|events| events.iter().filter(|&e| pred(e)).count())
    }

    /// Every outcome published so far, oldest first.
    pub fn outcomes(&self) -> Vec<VerificationOutcome> {
        self.inspect(|events| {
            events
                .iter()
                .filter_map(|e| match e {
                    PresentationEvent::Outcome { outcome, .. } => Some(outcome.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    /// Remove and return all recorded events.
    pub fn take(&self) -> Vec<PresentationEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Wait until at least `n` recorded events match `pred`.
    pub async fn wait_for(&self, n: usize, pred: impl Fn(&PresentationEvent) -> bool) {
        loop {
            let published = self.published.notified();
            if self.count(&pred) >= n {
                return;
            }
            published.await;
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSink for RecordingSink {
    fn publish(&self, event: PresentationEvent) {
        self.events.lock().unwrap().push(event);
        self.published.notify_waiters();
    }
}
