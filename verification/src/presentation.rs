//! Events for the presentation, haptic and announcement layer.
//!
//! The core never renders anything. It publishes discrete events and the
//! host decides how they look, sound and feel.

use crate::collaborators::ImageHandle;
use crate::orchestrator::AttemptId;
use crate::outcomes::VerificationOutcome;
use ageproof_liveness::LivenessEvent;
use ageproof_types::FaceState;

/// Haptic feedback requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HapticCue {
    /// Progress crossed 25, 50 or 75 percent.
    Milestone(u8),
    /// Liveness passed.
    Success,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PresentationEvent {
    StateChanged { from: FaceState, to: FaceState },
    ProgressTick { percent: u8 },
    Haptic(HapticCue),
    LivenessPassed,
    VerificationStarted { attempt_id: AttemptId },
    /// Terminal result of an attempt. `image` is only handed over on approval.
    Outcome {
        outcome: VerificationOutcome,
        image: Option<ImageHandle>,
    },
    RetryRequested,
    ExitRequested,
}

impl PresentationEvent {
    /// Translate one liveness event into the events the host sees.
    pub fn from_liveness(event: LivenessEvent) -> Vec<Self> {
        match event {
            LivenessEvent::StateChanged { from, to } => vec![Self::StateChanged { from, to }],
            LivenessEvent::ProgressTick { percent } => vec![Self::ProgressTick { percent }],
            LivenessEvent::Milestone { percent } => vec![Self::Haptic(HapticCue::Milestone(percent))],
            LivenessEvent::Passed => vec![Self::Haptic(HapticCue::Success), Self::LivenessPassed],
        }
    }
}

/// Receives presentation events. Invoked inline on the flow's consumer task;
/// keep handlers fast.
pub trait PresentationSink: Send + Sync {
    fn publish(&self, event: PresentationEvent);
}
