//! Runtime for one scan screen.
//!
//! Frames arrive from the camera on whatever context the host uses; user
//! intents arrive from the presentation layer. Both funnel through one bounded
//! mailbox into a single consumer task that owns the liveness session, the
//! attempt state and the retry controller. Orchestration attempts run on
//! spawned tasks and report back through a second channel, so the consumer is
//! the only writer.

pub mod config;
pub mod error;
pub mod handle;
pub mod logging;
pub mod runtime;
pub mod shutdown;
pub mod tracing_spans;

pub use config::FlowConfig;
pub use error::FlowError;
pub use handle::{FlowCommand, FlowHandle, FlowSnapshot};
pub use logging::{init_logging, LogFormat};
pub use runtime::VerificationFlow;
pub use shutdown::ShutdownController;
