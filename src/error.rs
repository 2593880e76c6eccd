//! Error types for stage-latency
//!
//! Alignment and statistics never fail: empty inputs produce empty results.
//! Errors only come from configuration checks and from the ingestion helpers
//! that turn raw rows into [`Sample`](crate::Sample)s.

use thiserror::Error;

/// Result type alias for stage-latency operations
pub type Result<T> = std::result::Result<T, LatencyError>;

/// Main error type for stage-latency operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatencyError {
    /// Configuration rejected by `validate()`
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A raw row could not be turned into a sample
    #[error("Invalid sample at {timestamp_ms} ms: {reason}")]
    InvalidSample { timestamp_ms: f64, reason: String },

    /// Channel index outside 0..8
    #[error("Channel index {0} out of range (expected 0..8)")]
    ChannelOutOfRange(usize),
}
