// Stage Latency - Multi-stage latency from logic captures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Frame reconstruction from per-channel edge sequences.
//!
//! Every edge on the anchor channel opens a frame attempt. The remaining
//! channels are visited in stage order; each contributes the earliest edge
//! not yet consumed that is no earlier than the previously accepted edge and
//! at most `max_frame_gap` after it. Edges older than the running time are
//! discarded for good. A frame is emitted only when every channel matched,
//! in which case one edge is consumed on each channel; otherwise only the
//! anchor advances.
//!
//! Each channel keeps its own cursor and cursors never move backwards, so a
//! full run is linear in the total number of edges.

use crate::channel::{ChannelIndex, StageOrder, CHANNEL_COUNT};
use crate::edge::EdgeSet;
use crate::error::{LatencyError, Result};
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// Default maximum gap between consecutive stages of a frame, in ms.
pub const DEFAULT_MAX_FRAME_GAP: f64 = 200.0;

/// Aligner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Maximum elapsed time between two successively accepted edges.
    pub max_frame_gap: f64,
    /// Anchor channel and scan order.
    pub stage_order: StageOrder,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            max_frame_gap: DEFAULT_MAX_FRAME_GAP,
            stage_order: StageOrder::default(),
        }
    }
}

impl AlignerConfig {
    /// Default stage order with a custom gap.
    pub fn with_max_frame_gap(max_frame_gap: f64) -> Self {
        Self {
            max_frame_gap,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_frame_gap.is_finite() || self.max_frame_gap <= 0.0 {
            return Err(LatencyError::InvalidConfig(format!(
                "max_frame_gap must be a positive number of ms, got {}",
                self.max_frame_gap
            )));
        }
        self.stage_order.validate()
    }
}

/// Outcome of one frame attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// All channels matched; one edge consumed on each.
    Emitted(Frame),
    /// `failed_channel` had no edge within the gap; the anchor edge is skipped.
    Rejected {
        anchor_ms: f64,
        failed_channel: ChannelIndex,
    },
}

/// Cursor state of an alignment run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignerState {
    cursors: [usize; CHANNEL_COUNT],
    stale: [usize; CHANNEL_COUNT],
}

impl AlignerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the next unconsumed edge of a channel.
    pub fn cursor(&self, channel: ChannelIndex) -> usize {
        self.cursors[channel.index()]
    }

    /// Edges discarded so far because they predated the running frame time.
    pub fn stale_edges(&self) -> [usize; CHANNEL_COUNT] {
        self.stale
    }

    /// Attempt one frame. `None` once the anchor channel is exhausted.
    pub fn step(&mut self, edges: &EdgeSet, config: &AlignerConfig) -> Option<Step> {
        let anchor = config.stage_order.anchor;
        let anchor_ms = *edges.channel(anchor).get(self.cursors[anchor.index()])?;

        let mut frame = Frame::default();
        frame.set(anchor, anchor_ms);
        let mut last_ms = anchor_ms;

        for &channel in &config.stage_order.scan {
            let seq = edges.channel(channel);
            let i = channel.index();

            while self.cursors[i] < seq.len() && seq[self.cursors[i]] < last_ms {
                #[cfg(feature = "logging")]
                log::trace!("{}: discarding stale edge at {} ms", channel, seq[self.cursors[i]]);
                self.cursors[i] += 1;
                self.stale[i] += 1;
            }

            match seq.get(self.cursors[i]) {
                Some(&t) if t - last_ms <= config.max_frame_gap => {
                    frame.set(channel, t);
                    last_ms = t;
                }
                _ => {
                    #[cfg(feature = "logging")]
                    log::debug!("frame at {} ms rejected: no {} edge in window", anchor_ms, channel);
                    self.cursors[anchor.index()] += 1;
                    return Some(Step::Rejected {
                        anchor_ms,
                        failed_channel: channel,
                    });
                }
            }
        }

        for cursor in self.cursors.iter_mut() {
            *cursor += 1;
        }
        Some(Step::Emitted(frame))
    }
}

/// Alignment counters, mostly for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    /// Frames emitted.
    pub frames: usize,
    /// Anchor edges that did not lead to a frame.
    pub rejected_anchors: usize,
    /// Per channel, how many rejections it caused.
    pub failures_by_channel: [usize; CHANNEL_COUNT],
    /// Per channel, edges skipped as older than the running frame time.
    pub stale_edges: [usize; CHANNEL_COUNT],
    /// Per channel, edges that ended up in no frame.
    pub unmatched_edges: [usize; CHANNEL_COUNT],
}

/// Frames plus the counters of the run that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub frames: Vec<Frame>,
    pub report: AlignmentReport,
}

/// Greedy windowed frame aligner.
#[derive(Debug, Clone, Default)]
pub struct FrameAligner {
    config: AlignerConfig,
}

impl FrameAligner {
    pub fn new(config: AlignerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// Lazily yield emitted frames.
    pub fn frames<'a>(&'a self, edges: &'a EdgeSet) -> Frames<'a> {
        Frames {
            edges,
            config: &self.config,
            state: AlignerState::new(),
        }
    }

    /// Run to completion and collect frames and counters.
    pub fn align(&self, edges: &EdgeSet) -> Alignment {
        let mut state = AlignerState::new();
        let mut frames = Vec::new();
        let mut report = AlignmentReport::default();

        while let Some(step) = state.step(edges, &self.config) {
            match step {
                Step::Emitted(frame) => frames.push(frame),
                Step::Rejected { failed_channel, .. } => {
                    report.rejected_anchors += 1;
                    report.failures_by_channel[failed_channel.index()] += 1;
                }
            }
        }

        report.frames = frames.len();
        report.stale_edges = state.stale_edges();
        let counts = edges.counts();
        for (unmatched, count) in report.unmatched_edges.iter_mut().zip(counts) {
            *unmatched = count.saturating_sub(frames.len());
        }

        #[cfg(feature = "logging")]
        log::info!(
            "aligned {} frames from {} edges ({} anchors rejected)",
            report.frames,
            edges.total(),
            report.rejected_anchors
        );

        Alignment { frames, report }
    }
}

/// Iterator returned by [`FrameAligner::frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    edges: &'a EdgeSet,
    config: &'a AlignerConfig,
    state: AlignerState,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            match self.state.step(self.edges, self.config)? {
                Step::Emitted(frame) => return Some(frame),
                Step::Rejected { .. } => continue,
            }
        }
    }
}
