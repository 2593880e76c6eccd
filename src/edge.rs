// Stage Latency - Multi-stage latency from logic captures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Rising-edge detection
//!
//! Each channel is scanned independently: a timestamp is emitted whenever
//! the level goes from low to high. The level before the first sample is
//! taken as low, so a capture that starts high yields an edge at its first
//! row. There is no debounce or hysteresis.

use crate::channel::{ChannelIndex, CHANNEL_COUNT};
use crate::sample::Sample;
use serde::{Deserialize, Serialize};

/// Lazy iterator over the rising-edge timestamps of one channel.
#[derive(Debug, Clone)]
pub struct RisingEdges<I> {
    levels: I,
    prev: bool,
}

impl<I> Iterator for RisingEdges<I>
where
    I: Iterator<Item = (f64, bool)>,
{
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        for (timestamp_ms, level) in self.levels.by_ref() {
            let rising = !self.prev && level;
            self.prev = level;
            if rising {
                return Some(timestamp_ms);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (_, upper) = self.levels.size_hint();
        (0, upper.map(|n| n / 2 + 1))
    }
}

/// Adapt a `(timestamp, level)` sequence into its rising edges.
pub fn rising_edges<I>(levels: I) -> RisingEdges<I::IntoIter>
where
    I: IntoIterator<Item = (f64, bool)>,
{
    RisingEdges {
        levels: levels.into_iter(),
        prev: false,
    }
}

/// Rising edges of a single channel of a sample table.
pub fn channel_edges(samples: &[Sample], channel: ChannelIndex) -> Vec<f64> {
    rising_edges(samples.iter().map(|s| (s.timestamp_ms, s.level(channel)))).collect()
}

/// Rising-edge timestamps for all eight channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeSet {
    channels: [Vec<f64>; CHANNEL_COUNT],
}

impl EdgeSet {
    /// Run edge detection on every channel of a sample table.
    pub fn detect(samples: &[Sample]) -> Self {
        let mut channels: [Vec<f64>; CHANNEL_COUNT] = Default::default();
        for channel in ChannelIndex::all() {
            channels[channel.index()] = channel_edges(samples, channel);
        }
        Self { channels }
    }

    /// Wrap edge sequences that were extracted elsewhere.
    pub fn from_channels(channels: [Vec<f64>; CHANNEL_COUNT]) -> Self {
        Self { channels }
    }

    /// Edge timestamps of one channel.
    pub fn channel(&self, channel: ChannelIndex) -> &[f64] {
        &self.channels[channel.index()]
    }

    /// Number of edges per channel.
    pub fn counts(&self) -> [usize; CHANNEL_COUNT] {
        std::array::from_fn(|i| self.channels[i].len())
    }

    /// Total number of edges across channels.
    pub fn total(&self) -> usize {
        self.channels.iter().map(Vec::len).sum()
    }

    /// True when no channel has any edge.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
