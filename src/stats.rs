//! Interval latency statistics
//!
//! Statistics are computed in batch over the whole frame sequence. A frame
//! contributes to an interval whenever both of its endpoints are present,
//! complete or not. No outliers are rejected.

use crate::frame::Frame;
use crate::interval::IntervalDefinition;
use serde::{Deserialize, Serialize};

/// Descriptive statistics of a non-empty set of latencies (ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; 0.0 for a single value.
    pub std_dev: f64,
}

impl LatencyStats {
    /// Compute statistics; `None` when `values` is empty.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let std_dev = if count > 1 {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            count,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            std_dev,
        })
    }
}

/// Statistics of one interval; `stats` is `None` when no frame had both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalSummary {
    pub definition: IntervalDefinition,
    pub stats: Option<LatencyStats>,
}

impl IntervalSummary {
    pub fn count(&self) -> usize {
        self.stats.map_or(0, |s| s.count)
    }

    pub fn has_data(&self) -> bool {
        self.stats.is_some()
    }
}

/// Per-frame latencies of one interval, skipping frames missing an endpoint.
pub fn interval_latencies(frames: &[Frame], definition: &IntervalDefinition) -> Vec<f64> {
    frames.iter().filter_map(|f| definition.latency(f)).collect()
}

/// Summaries for every definition, in definition order.
pub fn interval_statistics(
    frames: &[Frame],
    definitions: &[IntervalDefinition],
) -> Vec<IntervalSummary> {
    definitions
        .iter()
        .map(|definition| IntervalSummary {
            definition: definition.clone(),
            stats: LatencyStats::compute(&interval_latencies(frames, definition)),
        })
        .collect()
}
