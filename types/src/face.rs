//! Per-frame face observations and their discrete direction.

use crate::Timestamp;
use serde::{Deserialize, Serialize};

/// One frame's worth of face detection, as delivered by the camera source.
///
/// Transient: consumed by the classifier as soon as it arrives.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    /// Whether a face was detected at all.
    pub present: bool,
    /// Head yaw in degrees; negative is the subject's left. `None` when the
    /// detector could not estimate it.
    pub yaw_degrees: Option<f32>,
    /// When the frame was captured.
    pub timestamp: Timestamp,
}

impl FaceObservation {
    /// A frame with a face at the given yaw.
    pub fn face(yaw_degrees: f32, timestamp: Timestamp) -> Self {
        Self {
            present: true,
            yaw_degrees: Some(yaw_degrees),
            timestamp,
        }
    }

    /// A frame with no face.
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            present: false,
            yaw_degrees: None,
            timestamp,
        }
    }
}

/// Discrete head direction derived from yaw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceDirection {
    Frontal,
    LeftSkewed,
    RightSkewed,
    /// No face, or no usable yaw estimate.
    Unknown,
}

impl FaceDirection {
    pub fn is_frontal(&self) -> bool {
        matches!(self, Self::Frontal)
    }

    pub fn is_skewed(&self) -> bool {
        matches!(self, Self::LeftSkewed | Self::RightSkewed)
    }
}
