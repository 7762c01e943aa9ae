//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the verification core (clock, camera, OCR,
//! remote service, presentation layer) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return scripted values
//! - Can be controlled programmatically (advance time, stall a call)
//! - Record what they were asked to do
//!
//! Usage: hand them to the flow in place of the device and network adapters.

pub mod camera;
pub mod clock;
pub mod ocr;
pub mod remote;
pub mod sink;

pub use camera::NullCamera;
pub use clock::NullClock;
pub use ocr::NullOcr;
pub use remote::NullRemoteVerifier;
pub use sink::RecordingSink;
