// Stage Latency - Multi-stage latency from logic captures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reconstructed timing frames

use crate::channel::{ChannelIndex, StageOrder, CHANNEL_COUNT};
use serde::{Deserialize, Serialize};

/// One pass of a unit of audio through the pipeline: the matched edge time
/// of each stage, or `None` when the stage was not matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub stamps: [Option<f64>; CHANNEL_COUNT],
}

impl Frame {
    pub fn new(stamps: [Option<f64>; CHANNEL_COUNT]) -> Self {
        Self { stamps }
    }

    /// Timestamp of one stage.
    pub fn get(&self, channel: ChannelIndex) -> Option<f64> {
        self.stamps[channel.index()]
    }

    pub(crate) fn set(&mut self, channel: ChannelIndex, timestamp_ms: f64) {
        self.stamps[channel.index()] = Some(timestamp_ms);
    }

    /// All eight stages present.
    pub fn is_complete(&self) -> bool {
        self.stamps.iter().all(Option::is_some)
    }

    pub fn present_count(&self) -> usize {
        self.stamps.iter().filter(|s| s.is_some()).count()
    }

    /// Elapsed time from `from` to `to`, when both are present.
    pub fn latency(&self, from: ChannelIndex, to: ChannelIndex) -> Option<f64> {
        Some(self.get(to)? - self.get(from)?)
    }

    /// Timestamp of the T1 stage, whatever the frame was anchored on.
    pub fn t1(&self) -> Option<f64> {
        self.get(ChannelIndex::T1)
    }

    /// Timestamp of the anchor stage of `order`.
    pub fn anchor_time(&self, order: &StageOrder) -> Option<f64> {
        self.get(order.anchor)
    }
}
