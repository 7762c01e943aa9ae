//! Flow configuration with TOML file support.

use ageproof_types::params::{DEFAULT_HOLD_DURATION_MS, DEFAULT_YAW_THRESHOLD_DEGREES};
use ageproof_types::{LivenessParams, ParamsError};
use ageproof_verification::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::logging::{self, LogFormat};
use crate::FlowError;

/// Configuration for one verification flow.
///
/// Can be loaded from a TOML file via [`FlowConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Minimum age in whole years.
    #[serde(default = "default_minimum_age")]
    pub minimum_age: u32,

    /// How long a frontal face must be held to pass liveness.
    #[serde(default = "default_hold_duration_ms")]
    pub hold_duration_ms: u64,

    /// Absolute yaw beyond which a face counts as skewed.
    #[serde(default = "default_yaw_threshold")]
    pub yaw_threshold_degrees: f32,

    /// Mailbox depth; frames beyond it are dropped.
    #[serde(default = "default_frame_queue_capacity")]
    pub frame_queue_capacity: usize,

    /// Optional cap on the remote cross-check. Absent means the remote
    /// collaborator's own timeout applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_timeout_ms: Option<u64>,

    /// Whether a MEDIUM-confidence OCR reading may pass the local gate.
    #[serde(default = "default_true")]
    pub accept_medium_confidence: bool,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_minimum_age() -> u32 {
    60
}

fn default_hold_duration_ms() -> u64 {
    DEFAULT_HOLD_DURATION_MS
}

fn default_yaw_threshold() -> f32 {
    DEFAULT_YAW_THRESHOLD_DEGREES
}

fn default_frame_queue_capacity() -> usize {
    64
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl FlowConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, FlowError> {
        toml::from_str(s).map_err(|e| FlowError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, FlowError> {
        toml::to_string_pretty(self).map_err(|e| FlowError::Config(e.to_string()))
    }

    pub fn liveness_params(&self) -> LivenessParams {
        LivenessParams {
            hold_duration_ms: self.hold_duration_ms,
            yaw_threshold_degrees: self.yaw_threshold_degrees,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            minimum_age: self.minimum_age,
            accept_medium_confidence: self.accept_medium_confidence,
            remote_timeout: self.remote_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Reject values the flow cannot run with.
    pub fn validate(&self) -> Result<(), FlowError> {
        self.liveness_params().validate()?;
        if self.frame_queue_capacity == 0 {
            return Err(ParamsError::ZeroQueueCapacity.into());
        }
        if self.minimum_age == 0 || self.minimum_age > 150 {
            return Err(ParamsError::MinimumAgeOutOfRange(self.minimum_age).into());
        }
        self.log_format.parse::<LogFormat>()?;
        EnvFilter::try_new(&self.log_level)
            .map_err(|e| FlowError::Config(format!("invalid log level {:?}: {e}", self.log_level)))?;
        Ok(())
    }

    /// Install the global tracing subscriber described by `log_format` and
    /// `log_level`.
    pub fn init_logging(&self) -> Result<(), FlowError> {
        logging::init_logging(self.log_format.parse()?, &self.log_level)
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            minimum_age: default_minimum_age(),
            hold_duration_ms: default_hold_duration_ms(),
            yaw_threshold_degrees: default_yaw_threshold(),
            frame_queue_capacity: default_frame_queue_capacity(),
            remote_timeout_ms: None,
            accept_medium_confidence: default_true(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
