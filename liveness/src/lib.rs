//! Liveness detection.
//!
//! Two pieces:
//! 1. **Classifier**: maps one frame's face observation to a discrete direction.
//! 2. **Session**: consumes classified frames over time and passes liveness once
//!    a frontal face has been held without interruption for the hold duration.
//!
//! Haptic and announcement cues are derived from progress transitions as
//! edge-triggered events; the session never talks to a device directly.

pub mod classifier;
pub mod milestones;
pub mod session;

pub use classifier::{classify, classify_with};
pub use milestones::crossed_milestones;
pub use session::{LivenessEvent, LivenessSession, SessionSnapshot};
