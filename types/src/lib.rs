//! Fundamental types for the age and liveness verification core.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! timestamps and clocks, per-frame face observations, liveness session states,
//! remote assessment enums, and the tunable liveness parameters.

pub mod assessment;
pub mod clock;
pub mod error;
pub mod face;
pub mod params;
pub mod state;
pub mod time;

pub use assessment::{ConfidenceLevel, Recommendation, RiskLevel};
pub use clock::{Clock, SystemClock};
pub use error::ParamsError;
pub use face::{FaceDirection, FaceObservation};
pub use params::LivenessParams;
pub use state::FaceState;
pub use time::Timestamp;
