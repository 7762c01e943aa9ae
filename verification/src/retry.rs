//! Rejection / retry controller.
//!
//! Two exit intents, kept apart:
//! - **Retake**: throw away the image, OCR result and outcome, reset liveness
//!   to `Searching`, start over. Liveness is never reused across attempts,
//!   even when only the document step failed.
//! - **Exit**: throw everything away and hand control back to the host. Nothing
//!   from the attempt may reach registration.
//!
//! Both are safe to repeat. Only a call that actually changes something
//! reports an action, so the host fires each side effect once.

use crate::orchestrator::AttemptId;
use crate::state::AttemptState;
use ageproof_liveness::LivenessSession;
use ageproof_types::FaceState;
use tracing::{debug, info};

/// What a retake or exit call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryAction {
    /// State was discarded and liveness restarted. `cancelled` is the attempt
    /// that was in flight, if any; its result must be ignored.
    Reset { cancelled: Option<AttemptId> },
    /// The flow was abandoned.
    Exited { cancelled: Option<AttemptId> },
    /// Nothing changed.
    NoOp,
}

#[derive(Debug, Default)]
pub struct RetryController {
    exited: bool,
}

impl RetryController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Discard the attempt and restart liveness.
    pub fn retake(&mut self, session: &mut LivenessSession, attempt: &mut AttemptState) -> RetryAction {
        if self.exited {
            return RetryAction::NoOp;
        }
        if session.state() == FaceState::Idle && attempt.is_clear() {
            debug!("retake before the camera is ready, nothing to discard");
            return RetryAction::NoOp;
        }
        let fresh = attempt.is_clear()
            && session.state() == FaceState::Searching
            && session.progress_percent() == 0;

        let cancelled = attempt.clear();
        session.reset();

        if fresh {
            debug!("retake on a fresh session, nothing to discard");
            return RetryAction::NoOp;
        }
        info!(cancelled = ?cancelled, generation = session.generation(), "attempt discarded for retake");
        RetryAction::Reset { cancelled }
    }

    /// Discard everything and leave. Later retakes and exits are no-ops.
    pub fn exit(&mut self, session: &mut LivenessSession, attempt: &mut AttemptState) -> RetryAction {
        if self.exited {
            return RetryAction::NoOp;
        }
        self.exited = true;
        let cancelled = attempt.clear();
        session.reset();
        info!(cancelled = ?cancelled, "verification flow abandoned");
        RetryAction::Exited { cancelled }
    }
}
