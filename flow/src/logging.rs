//! Tracing subscriber setup for the application embedding a flow.
//!
//! The flow crates only emit `tracing` events; installing a subscriber is
//! left to the host, usually once at startup via
//! [`FlowConfig::init_logging`](crate::FlowConfig::init_logging). `RUST_LOG`
//! takes precedence over the configured level.

use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::FlowError;

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Plain text, for a developer watching a device log.
    Human,
    /// One JSON object per line, for hosts that ship logs elsewhere.
    Json,
}

impl FromStr for LogFormat {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(FlowError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Install a global subscriber filtered by `level` (an `EnvFilter`
/// directive). Fails if the host already installed one.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), FlowError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let installed = match format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(true))
            .try_init(),
    };
    installed.map_err(|e| FlowError::Config(e.to_string()))
}
