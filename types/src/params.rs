//! Liveness parameters: the hold duration and the classifier boundary.

use crate::ParamsError;
use serde::{Deserialize, Serialize};

/// Reference hold duration for a stable frontal face, in milliseconds.
pub const DEFAULT_HOLD_DURATION_MS: u64 = 2_000;

/// Reference yaw boundary in degrees. `|yaw| <= 25` is frontal.
pub const DEFAULT_YAW_THRESHOLD_DEGREES: f32 = 25.0;

/// Progress crossings that fire a haptic pulse.
pub const PROGRESS_MILESTONES: [u8; 3] = [25, 50, 75];

/// Tunables for the classifier and the liveness session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LivenessParams {
    /// How long a contiguous frontal run must last to pass liveness.
    pub hold_duration_ms: u64,
    /// Absolute yaw beyond which a face counts as skewed.
    pub yaw_threshold_degrees: f32,
}

impl LivenessParams {
    pub fn reference() -> Self {
        Self {
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            yaw_threshold_degrees: DEFAULT_YAW_THRESHOLD_DEGREES,
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.hold_duration_ms == 0 {
            return Err(ParamsError::ZeroHoldDuration);
        }
        if !self.yaw_threshold_degrees.is_finite() || self.yaw_threshold_degrees <= 0.0 {
            return Err(ParamsError::InvalidYawThreshold(self.yaw_threshold_degrees));
        }
        Ok(())
    }
}

impl Default for LivenessParams {
    fn default() -> Self {
        Self::reference()
    }
}
