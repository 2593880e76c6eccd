//! Named stage-to-stage intervals

use crate::channel::ChannelIndex;
use crate::frame::Frame;
use serde::{Deserialize, Serialize};

/// A measured interval: elapsed time from stage `from` to stage `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalDefinition {
    pub label: String,
    pub from: ChannelIndex,
    pub to: ChannelIndex,
}

impl IntervalDefinition {
    pub fn new(label: impl Into<String>, from: ChannelIndex, to: ChannelIndex) -> Self {
        Self {
            label: label.into(),
            from,
            to,
        }
    }

    /// Latency of this interval in a frame, when both stages are present.
    pub fn latency(&self, frame: &Frame) -> Option<f64> {
        frame.latency(self.from, self.to)
    }

    /// Column heading such as `"T2-T1"`.
    pub fn span(&self) -> String {
        format!("{}-{}", self.to.label(), self.from.label())
    }

    /// The six intervals of the audio pipeline, in report order.
    pub fn standard() -> Vec<IntervalDefinition> {
        STANDARD
            .iter()
            .filter_map(|&(label, from, to)| {
                Some(Self::new(
                    label,
                    ChannelIndex::new(from)?,
                    ChannelIndex::new(to)?,
                ))
            })
            .collect()
    }
}

const STANDARD: [(&str, usize, usize); 6] = [
    ("Input Buffering", 0, 1),
    ("Encoding", 1, 2),
    ("Network", 3, 4),
    ("Decoding", 5, 6),
    ("Output Buffering", 6, 7),
    ("End-to-End", 0, 7),
];
