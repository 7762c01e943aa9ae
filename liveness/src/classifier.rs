//! Face observation classifier.

use ageproof_types::params::DEFAULT_YAW_THRESHOLD_DEGREES;
use ageproof_types::{FaceDirection, FaceObservation};

/// Classify a frame with the reference ±25° boundary.
pub fn classify(observation: &FaceObservation) -> FaceDirection {
    classify_with(observation, DEFAULT_YAW_THRESHOLD_DEGREES)
}

/// Classify a frame against a custom yaw boundary.
///
/// `|yaw| <= threshold` is frontal; the boundary itself counts as frontal.
/// A missing face, a missing yaw, or a NaN yaw is `Unknown`.
pub fn classify_with(observation: &FaceObservation, threshold: f32) -> FaceDirection {
    if !observation.present {
        return FaceDirection::Unknown;
    }
    match observation.yaw_degrees {
        Some(yaw) if yaw.is_nan() => FaceDirection::Unknown,
        Some(yaw) if yaw < -threshold => FaceDirection::LeftSkewed,
        Some(yaw) if yaw > threshold => FaceDirection::RightSkewed,
        Some(_) => FaceDirection::Frontal,
        None => FaceDirection::Unknown,
    }
}
