// Stage Latency - Multi-stage latency from logic captures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Captured samples
//!
//! A sample is one row of a logic capture: a timestamp in milliseconds and
//! the level of each of the eight channels at that instant.

use crate::channel::{ChannelIndex, CHANNEL_COUNT};
use crate::error::{LatencyError, Result};
use serde::{Deserialize, Serialize};

/// One row of the sample table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Capture time in milliseconds.
    pub timestamp_ms: f64,
    /// Channel levels, index 0 is D0 (T1).
    pub levels: [bool; CHANNEL_COUNT],
}

impl Sample {
    /// Create a sample from already validated levels.
    pub fn new(timestamp_ms: f64, levels: [bool; CHANNEL_COUNT]) -> Self {
        Self {
            timestamp_ms,
            levels,
        }
    }

    /// Build a sample from eight 0/1 values.
    pub fn from_bits(timestamp_ms: f64, bits: &[u8]) -> Result<Self> {
        if bits.len() != CHANNEL_COUNT {
            return Err(LatencyError::InvalidSample {
                timestamp_ms,
                reason: format!("expected {} levels, got {}", CHANNEL_COUNT, bits.len()),
            });
        }
        let mut levels = [false; CHANNEL_COUNT];
        for (i, (&bit, level)) in bits.iter().zip(levels.iter_mut()).enumerate() {
            *level = match bit {
                0 => false,
                1 => true,
                other => {
                    return Err(LatencyError::InvalidSample {
                        timestamp_ms,
                        reason: format!("D{} has non-binary level {}", i, other),
                    })
                }
            };
        }
        Ok(Self::new(timestamp_ms, levels))
    }

    /// Parse a `D0-D7` binary string such as `"0b00000001"` or `"101"`.
    ///
    /// The first character is D0. Short strings are left-padded with zeros.
    pub fn from_bit_string(timestamp_ms: f64, bits: &str) -> Result<Self> {
        let bits = bits.trim();
        let bits = bits.strip_prefix("0b").unwrap_or(bits);
        if bits.len() > CHANNEL_COUNT {
            return Err(LatencyError::InvalidSample {
                timestamp_ms,
                reason: format!("bit string '{}' longer than {}", bits, CHANNEL_COUNT),
            });
        }
        let padded = format!("{:0>width$}", bits, width = CHANNEL_COUNT);
        let values = padded
            .chars()
            .map(|c| match c {
                '0' => Ok(0),
                '1' => Ok(1),
                other => Err(LatencyError::InvalidSample {
                    timestamp_ms,
                    reason: format!("unexpected character '{}' in bit string", other),
                }),
            })
            .collect::<Result<Vec<u8>>>()?;
        Self::from_bits(timestamp_ms, &values)
    }

    /// Level of one channel.
    pub fn level(&self, channel: ChannelIndex) -> bool {
        self.levels[channel.index()]
    }
}
