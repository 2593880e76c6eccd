// Stage Latency - Multi-stage latency from logic captures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Channel indices, stage labels and stage ordering
//!
//! A capture carries eight digital channels, D0..D7, wired to the eight
//! timing points T1..T8 of the audio pipeline. The first four are toggled by
//! the gateway, the last four by the headset, both using the same four pins.

use crate::error::{LatencyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of digital channels in a capture.
pub const CHANNEL_COUNT: usize = 8;

/// Index of a capture channel, always in `0..CHANNEL_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChannelIndex(u8);

impl ChannelIndex {
    /// Channel T1, the anchor of the default stage order.
    pub const T1: ChannelIndex = ChannelIndex(0);
    /// Channel T8, the last stage of the pipeline.
    pub const T8: ChannelIndex = ChannelIndex(7);

    /// Create a channel index, `None` when out of range.
    pub fn new(index: usize) -> Option<Self> {
        (index < CHANNEL_COUNT).then_some(Self(index as u8))
    }

    /// Zero-based index, usable to address per-channel arrays.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Stage label, `"T1"` through `"T8"`.
    pub fn label(self) -> &'static str {
        DESCRIPTORS[self.index()].label
    }

    /// Presentational descriptor for this channel.
    pub fn descriptor(self) -> &'static ChannelDescriptor {
        &DESCRIPTORS[self.index()]
    }

    /// All channels in index order.
    pub fn all() -> impl Iterator<Item = ChannelIndex> {
        (0..CHANNEL_COUNT as u8).map(ChannelIndex)
    }
}

impl TryFrom<u8> for ChannelIndex {
    type Error = LatencyError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value as usize).ok_or(LatencyError::ChannelOutOfRange(value as usize))
    }
}

impl TryFrom<usize> for ChannelIndex {
    type Error = LatencyError;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value).ok_or(LatencyError::ChannelOutOfRange(value))
    }
}

impl From<ChannelIndex> for u8 {
    fn from(channel: ChannelIndex) -> u8 {
        channel.0
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Device that toggles a timing pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceRole {
    /// Capturing/encoding side.
    Gateway,
    /// Decoding/playback side.
    Headset,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRole::Gateway => f.write_str("Gateway"),
            DeviceRole::Headset => f.write_str("Headset"),
        }
    }
}

/// Fixed description of what a channel measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDescriptor {
    pub label: &'static str,
    pub role: DeviceRole,
    pub pin: &'static str,
    pub event: &'static str,
}

const DESCRIPTORS: [ChannelDescriptor; CHANNEL_COUNT] = [
    ChannelDescriptor {
        label: "T1",
        role: DeviceRole::Gateway,
        pin: "P0.26",
        event: "audio capture",
    },
    ChannelDescriptor {
        label: "T2",
        role: DeviceRole::Gateway,
        pin: "P0.25",
        event: "encode start",
    },
    ChannelDescriptor {
        label: "T3",
        role: DeviceRole::Gateway,
        pin: "P0.07",
        event: "encode complete",
    },
    ChannelDescriptor {
        label: "T4",
        role: DeviceRole::Gateway,
        pin: "P0.28",
        event: "network tx",
    },
    ChannelDescriptor {
        label: "T5",
        role: DeviceRole::Headset,
        pin: "P0.26",
        event: "network rx",
    },
    ChannelDescriptor {
        label: "T6",
        role: DeviceRole::Headset,
        pin: "P0.25",
        event: "decode start",
    },
    ChannelDescriptor {
        label: "T7",
        role: DeviceRole::Headset,
        pin: "P0.07",
        event: "decode complete",
    },
    ChannelDescriptor {
        label: "T8",
        role: DeviceRole::Headset,
        pin: "P0.28",
        event: "audio output",
    },
];

/// Order in which the aligner visits channels when building a frame.
///
/// The anchor defines frames; every channel in `scan` must fire after the
/// previously accepted one. Together they name each channel exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOrder {
    pub anchor: ChannelIndex,
    pub scan: Vec<ChannelIndex>,
}

impl Default for StageOrder {
    fn default() -> Self {
        Self {
            anchor: ChannelIndex::T1,
            scan: ChannelIndex::all().skip(1).collect(),
        }
    }
}

impl StageOrder {
    /// Create a stage order from an anchor and scan list.
    pub fn new(anchor: ChannelIndex, scan: Vec<ChannelIndex>) -> Result<Self> {
        let order = Self { anchor, scan };
        order.validate()?;
        Ok(order)
    }

    /// Check that anchor and scan list cover every channel exactly once.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; CHANNEL_COUNT];
        for channel in self.iter() {
            if std::mem::replace(&mut seen[channel.index()], true) {
                return Err(LatencyError::InvalidConfig(format!(
                    "stage order names {} more than once",
                    channel
                )));
            }
        }
        if let Some(missing) = ChannelIndex::all().find(|c| !seen[c.index()]) {
            return Err(LatencyError::InvalidConfig(format!(
                "stage order does not include {}",
                missing
            )));
        }
        Ok(())
    }

    /// Anchor followed by the scan list.
    pub fn iter(&self) -> impl Iterator<Item = ChannelIndex> + '_ {
        std::iter::once(self.anchor).chain(self.scan.iter().copied())
    }
}
