//! Pre-built [`tracing::Span`] constructors for flow operations.
//!
//! Consistent span names and fields make it easy to follow one attempt from
//! capture to outcome across log lines.

use tracing::{info_span, Span};

/// Span covering the consumer loop of one scan screen.
pub fn flow_span(minimum_age: u32) -> Span {
    info_span!("verification_flow", minimum_age = minimum_age)
}

/// Span covering one orchestration attempt.
pub fn attempt_span(attempt_id: u64, resumed: bool) -> Span {
    info_span!("verification_attempt", attempt = attempt_id, resumed = resumed)
}
