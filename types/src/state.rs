//! Liveness session states.

use serde::{Deserialize, Serialize};

/// Where a liveness session is in its scan.
///
/// `Idle` precedes camera readiness; `Verified` is terminal until reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceState {
    /// Camera not ready yet; observations are ignored.
    Idle,
    /// No usable face in frame.
    Searching,
    /// A face is present but not looking at the camera.
    Detected,
    /// Frontal hold in progress; progress is accruing.
    Verifying,
    /// Hold completed; liveness passed.
    Verified,
}

impl FaceState {
    /// Whether observations can still move this state.
    pub fn accepts_observations(&self) -> bool {
        matches!(self, Self::Searching | Self::Detected | Self::Verifying)
    }

    /// Whether progress toward the hold is being accrued.
    pub fn is_accruing(&self) -> bool {
        matches!(self, Self::Verifying)
    }
}
