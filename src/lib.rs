//! # stage-latency - Multi-stage latency from logic captures
//!
//! Reconstructs per-frame timing of an eight-stage pipeline from a digital
//! capture of eight channels, one per stage, and summarises the latency of
//! selected stage-to-stage intervals.
//!
//! ## Key Features
//!
//! - **Edge detection**: low-to-high transitions per channel
//! - **Frame alignment**: greedy, windowed, tolerant of missing and extra edges
//! - **Interval statistics**: count, mean, median, min, max, std per interval
//! - **Configurable**: gap window, stage order and intervals, all serde-loadable
//!
//! ## Quick Start
//!
//! ```rust
//! use stage_latency::{Analyzer, Sample, CHANNEL_COUNT};
//!
//! // One frame: stage i pulses at i * 10 ms
//! let mut samples = Vec::new();
//! for i in 0..CHANNEL_COUNT {
//!     let mut levels = [false; CHANNEL_COUNT];
//!     levels[i] = true;
//!     samples.push(Sample::new(i as f64 * 10.0, levels));
//!     samples.push(Sample::new(i as f64 * 10.0 + 1.0, [false; CHANNEL_COUNT]));
//! }
//!
//! let analysis = Analyzer::default().analyze(&samples);
//! assert_eq!(analysis.frames.len(), 1);
//!
//! let e2e = analysis.interval("End-to-End").unwrap().stats.unwrap();
//! assert_eq!(e2e.mean, 70.0);
//! ```
//!
//! ## Modules
//!
//! - [`channel`]: Channel indices, stage labels, stage order
//! - [`sample`]: Captured rows
//! - [`edge`]: Rising-edge detection
//! - [`aligner`]: Frame reconstruction
//! - [`interval`]: Named stage-to-stage intervals
//! - [`stats`]: Latency statistics
//! - [`analysis`]: The full pipeline

// Modules
pub mod aligner;
pub mod analysis;
pub mod channel;
pub mod edge;
pub mod error;
pub mod frame;
pub mod interval;
pub mod sample;
pub mod stats;

// Re-exports for convenient access
pub use aligner::{
    AlignerConfig, AlignerState, Alignment, AlignmentReport, FrameAligner, Frames, Step,
    DEFAULT_MAX_FRAME_GAP,
};
pub use analysis::{Analysis, AnalysisConfig, Analyzer};
pub use channel::{ChannelDescriptor, ChannelIndex, DeviceRole, StageOrder, CHANNEL_COUNT};
pub use edge::{channel_edges, rising_edges, EdgeSet, RisingEdges};
pub use error::{LatencyError, Result};
pub use frame::Frame;
pub use interval::IntervalDefinition;
pub use sample::Sample;
pub use stats::{interval_latencies, interval_statistics, IntervalSummary, LatencyStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
