//! Liveness session state machine.
//!
//! Progress only accrues during an uninterrupted run of frontal frames:
//! - the first frontal frame starts the run (`stable_since = now`, 0%);
//! - every later frontal frame recomputes `elapsed / hold * 100`, capped at 100;
//! - any skewed frame drops to `Detected`, any faceless frame to `Searching`,
//!   both clearing the run with no grace period.
//!
//! Reaching 100% enters `Verified` exactly once. Further frames are ignored
//! until [`LivenessSession::reset`]. Every reset bumps the generation so that
//! frames delivered before it can be recognised as stale.

use crate::classifier::classify_with;
use crate::milestones::crossed_milestones;
use ageproof_types::{FaceDirection, FaceObservation, FaceState, LivenessParams, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Events emitted by the session for the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LivenessEvent {
    /// The session moved between states.
    StateChanged { from: FaceState, to: FaceState },
    /// Hold progress changed.
    ProgressTick { percent: u8 },
    /// Progress crossed a haptic milestone (25, 50 or 75).
    Milestone { percent: u8 },
    /// The hold completed. Fired once per session generation.
    Passed,
}

/// Read-only view of the session's observable fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: FaceState,
    pub stable_since: Option<Timestamp>,
    pub progress_percent: u8,
}

/// One scan attempt's liveness state.
pub struct LivenessSession {
    params: LivenessParams,
    state: FaceState,
    stable_since: Option<Timestamp>,
    progress_percent: u8,
    generation: u64,
    pending_events: Vec<LivenessEvent>,
}

impl LivenessSession {
    /// A session waiting for the camera (`Idle`).
    pub fn new(params: LivenessParams) -> Self {
        Self {
            params,
            state: FaceState::Idle,
            stable_since: None,
            progress_percent: 0,
            generation: 0,
            pending_events: Vec::new(),
        }
    }

    /// Camera is ready: `Idle` moves to `Searching`. No-op in any other state.
    pub fn start(&mut self) {
        if self.state == FaceState::Idle {
            self.transition(FaceState::Searching);
        }
    }

    /// Feed one frame. Returns the state after the frame was applied.
    pub fn observe(&mut self, observation: &FaceObservation) -> FaceState {
        if !self.state.accepts_observations() {
            return self.state;
        }
        let direction = classify_with(observation, self.params.yaw_threshold_degrees);
        self.apply(direction, observation.timestamp);
        self.state
    }

    fn apply(&mut self, direction: FaceDirection, now: Timestamp) {
        match direction {
            FaceDirection::Frontal => self.accrue(now),
            FaceDirection::LeftSkewed | FaceDirection::RightSkewed => {
                self.clear_run();
                self.transition(FaceState::Detected);
            }
            FaceDirection::Unknown => {
                self.clear_run();
                self.transition(FaceState::Searching);
            }
        }
    }

    fn accrue(&mut self, now: Timestamp) {
        let Some(since) = self.stable_since else {
            self.stable_since = Some(now);
            self.transition(FaceState::Verifying);
            return;
        };

        let elapsed = since.elapsed_since(now);
        let computed = (elapsed.saturating_mul(100) / self.params.hold_duration_ms).min(100) as u8;
        // Frames may arrive with out-of-order timestamps; never walk progress back.
        let percent = computed.max(self.progress_percent);
        self.set_progress(percent);

        if percent == 100 {
            self.transition(FaceState::Verified);
            info!(generation = self.generation, "liveness hold completed");
            self.pending_events.push(LivenessEvent::Passed);
        }
    }

    fn clear_run(&mut self) {
        self.stable_since = None;
        self.set_progress(0);
    }

    fn set_progress(&mut self, percent: u8) {
        if percent == self.progress_percent {
            return;
        }
        let previous = self.progress_percent;
        self.progress_percent = percent;
        self.pending_events
            .push(LivenessEvent::ProgressTick { percent });
        for milestone in crossed_milestones(previous, percent) {
            self.pending_events
                .push(LivenessEvent::Milestone { percent: milestone });
        }
    }

    fn transition(&mut self, to: FaceState) {
        if self.state == to {
            return;
        }
        debug_assert!(to != FaceState::Verified || self.progress_percent == 100);
        let from = self.state;
        self.state = to;
        debug!(?from, ?to, generation = self.generation, "liveness state change");
        self.pending_events
            .push(LivenessEvent::StateChanged { from, to });
    }

    /// Return to `{Searching, None, 0}` from any state and start a new generation.
    ///
    /// Events are only emitted for fields that actually changed, so resetting
    /// an already-fresh session is silent.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.clear_run();
        self.transition(FaceState::Searching);
        debug!(generation = self.generation, "liveness session reset");
    }

    /// Image capture failed after liveness passed. The proof is spent; the
    /// user has to hold again.
    pub fn capture_failed(&mut self) {
        if self.state == FaceState::Verified {
            self.reset();
        }
    }

    pub fn state(&self) -> FaceState {
        self.state
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn stable_since(&self) -> Option<Timestamp> {
        self.stable_since
    }

    /// Incremented on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn params(&self) -> &LivenessParams {
        &self.params
    }

    pub fn is_verified(&self) -> bool {
        self.state == FaceState::Verified
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            stable_since: self.stable_since,
            progress_percent: self.progress_percent,
        }
    }

    /// Drain pending events for the presentation layer.
    pub fn drain_events(&mut self) -> Vec<LivenessEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

impl Default for LivenessSession {
    fn default() -> Self {
        Self::new(LivenessParams::reference())
    }
}
