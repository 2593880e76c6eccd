// Stage Latency Testdata - Anomaly injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Anomaly injection for testing frame reconstruction.
//!
//! Real captures lose pulses (a GPIO toggle missed), pick up extra ones (a
//! stage firing twice) and see pulses broken up by a short low dip. Any of
//! them can be placed at a specific frame; drops and strays can also be
//! sprinkled at random through the generator's rates.

use serde::{Deserialize, Serialize};
use stage_latency::ChannelIndex;

/// Anomaly placed at one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Frame index the anomaly applies to.
    pub frame: usize,
    /// What happens.
    pub anomaly_type: AnomalyType,
}

impl AnomalyConfig {
    /// Create a new anomaly configuration.
    pub fn new(frame: usize, anomaly_type: AnomalyType) -> Self {
        Self {
            frame,
            anomaly_type,
        }
    }

    /// The pulse of `channel` in `frame` never happens.
    pub fn drop_edge(frame: usize, channel: ChannelIndex) -> Self {
        Self::new(frame, AnomalyType::DropEdge { channel })
    }

    /// An extra pulse on `channel`, `offset_ms` after the frame's T1.
    pub fn stray_edge(frame: usize, channel: ChannelIndex, offset_ms: f64) -> Self {
        Self::new(frame, AnomalyType::StrayEdge { channel, offset_ms })
    }

    /// The pulse of `channel` in `frame` dips low for `width_ms`, starting
    /// `offset_ms` after its rising edge.
    pub fn glitch(frame: usize, channel: ChannelIndex, offset_ms: f64, width_ms: f64) -> Self {
        Self::new(
            frame,
            AnomalyType::Glitch {
                channel,
                offset_ms,
                width_ms,
            },
        )
    }

    /// Dip `(offset_ms, width_ms)` cut out of the given frame/channel pulse.
    pub fn dip(&self, frame: usize, channel: ChannelIndex) -> Option<(f64, f64)> {
        match self.anomaly_type {
            AnomalyType::Glitch {
                channel: c,
                offset_ms,
                width_ms,
            } if c == channel && self.frame == frame => Some((offset_ms, width_ms)),
            _ => None,
        }
    }

    /// True when this anomaly removes the given frame/channel pulse.
    pub fn drops(&self, frame: usize, channel: ChannelIndex) -> bool {
        matches!(
            self.anomaly_type,
            AnomalyType::DropEdge { channel: c } if c == channel && self.frame == frame
        )
    }
}

/// Type of anomaly to inject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnomalyType {
    /// The stage pulse is missing.
    ///
    /// Expected outcome: the frame is dropped.
    DropEdge { channel: ChannelIndex },

    /// An additional pulse, relative to the frame's T1 time.
    ///
    /// Expected outcome: discarded when it precedes the running frame time,
    /// otherwise it may be matched in place of the real pulse.
    StrayEdge { channel: ChannelIndex, offset_ms: f64 },

    /// A short low dip inside the stage pulse, relative to its rising edge.
    ///
    /// Expected outcome: a second rising edge right after the real one. The
    /// frame keeps the first; the second goes stale on a non-anchor channel.
    Glitch {
        channel: ChannelIndex,
        offset_ms: f64,
        width_ms: f64,
    },
}
