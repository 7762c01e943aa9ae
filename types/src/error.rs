//! Parameter validation errors shared across crates.

use thiserror::Error;

/// Rejected configuration or liveness parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("hold duration must be greater than zero")]
    ZeroHoldDuration,

    #[error("yaw threshold must be a finite positive angle, got {0}")]
    InvalidYawThreshold(f32),

    #[error("frame queue capacity must be greater than zero")]
    ZeroQueueCapacity,

    #[error("minimum age {0} is outside the supported range")]
    MinimumAgeOutOfRange(u32),
}
