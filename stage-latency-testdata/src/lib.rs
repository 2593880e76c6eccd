// Stage Latency Testdata - Synthetic capture generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Stage Latency Testdata
//!
//! Synthetic logic-analyzer captures for the stage-latency toolkit.
//!
//! A capture is eight GPIO channels (T1..T8) pulsed once per audio frame,
//! each stage a jittered delay after the previous one, sampled on a uniform
//! grid. Because the pulse times are known, the generated
//! [`GeneratedCapture::truth`] can be checked against what the analyzer
//! reconstructs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stage_latency_testdata::{generate_capture, CsvLayout, GeneratorConfig};
//!
//! let config = GeneratorConfig::new()
//!     .with_frames(500)
//!     .with_frame_period_ms(100.0)
//!     .with_seed(42);
//!
//! let capture = generate_capture(&config).unwrap();
//! capture.to_csv("capture.csv", CsvLayout::Separate).unwrap();
//! ```
//!
//! ## Anomaly Injection
//!
//! ```rust
//! use stage_latency::ChannelIndex;
//! use stage_latency_testdata::{AnomalyConfig, GeneratorConfig};
//!
//! let config = GeneratorConfig::new()
//!     .with_anomaly(AnomalyConfig::drop_edge(3, ChannelIndex::T8))
//!     .with_anomaly(AnomalyConfig::stray_edge(5, ChannelIndex::T1, 40.0))
//!     .with_anomaly(AnomalyConfig::glitch(8, ChannelIndex::T8, 0.3, 0.2));
//! assert_eq!(config.anomalies.len(), 3);
//! assert!(config.validate().is_ok());
//! ```

pub mod anomalies;
pub mod capture;
pub mod generator;

// Re-exports for convenience
pub use anomalies::{AnomalyConfig, AnomalyType};
pub use capture::{CaptureManifest, CsvLayout, FrameTruth, GeneratedCapture};
pub use generator::{
    generate_capture, GeneratorConfig, GeneratorError, StageDelay, DEFAULT_STAGE_DELAYS,
    MAX_SAMPLES,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
