// Stage Latency Testdata - Core generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Core capture generation logic.
//!
//! Each frame starts with a T1 pulse at a fixed period. Every following stage
//! fires after a normally distributed delay (clamped at zero) from the
//! previous one. Pulses are then rasterized onto a uniform sampling grid,
//! the way a logic analyzer would record them.

use crate::anomalies::{AnomalyConfig, AnomalyType};
use crate::capture::{FrameTruth, GeneratedCapture};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use stage_latency::{ChannelIndex, Sample, CHANNEL_COUNT};
use thiserror::Error;

/// Generator error types.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Delay between two consecutive stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageDelay {
    pub mean_ms: f64,
    pub jitter_ms: f64,
}

impl StageDelay {
    pub const fn new(mean_ms: f64, jitter_ms: f64) -> Self {
        Self { mean_ms, jitter_ms }
    }
}

/// Most samples a generated capture may hold.
pub const MAX_SAMPLES: usize = 20_000_000;

/// Delays T1->T2, T2->T3, ..., T7->T8 of a WiFi audio link.
pub const DEFAULT_STAGE_DELAYS: [StageDelay; CHANNEL_COUNT - 1] = [
    StageDelay::new(10.0, 0.5), // input buffering
    StageDelay::new(4.0, 0.3),  // encoding
    StageDelay::new(1.0, 0.1),  // hand-off to the radio
    StageDelay::new(8.0, 2.0),  // network
    StageDelay::new(1.0, 0.1),  // hand-off to the decoder
    StageDelay::new(3.0, 0.2),  // decoding
    StageDelay::new(12.0, 1.0), // output buffering
];

/// Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of frames to generate.
    pub frames: usize,
    /// Time between consecutive T1 pulses.
    pub frame_period_ms: f64,
    /// T1 time of the first frame. The capture itself starts at 0.
    pub start_ms: f64,
    /// Stage-to-stage delays.
    pub stage_delays: [StageDelay; CHANNEL_COUNT - 1],
    /// High time of every pulse.
    pub pulse_width_ms: f64,
    /// Sampling period of the simulated analyzer.
    pub sample_period_ms: f64,
    /// Probability that any stage pulse is lost.
    pub drop_rate: f64,
    /// Probability, per frame and channel, of an extra pulse.
    pub stray_rate: f64,
    /// Anomalies at fixed frames.
    #[serde(default)]
    pub anomalies: Vec<AnomalyConfig>,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            frames: 100,
            frame_period_ms: 100.0,
            start_ms: 10.0,
            stage_delays: DEFAULT_STAGE_DELAYS,
            pulse_width_ms: 1.0,
            sample_period_ms: 0.1, // 10 kHz
            drop_rate: 0.0,
            stray_rate: 0.0,
            anomalies: Vec::new(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator config.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frames(mut self, frames: usize) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_frame_period_ms(mut self, period_ms: f64) -> Self {
        self.frame_period_ms = period_ms;
        self
    }

    pub fn with_start_ms(mut self, start_ms: f64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Set the delay of one hop, `hop` 0 being T1->T2.
    pub fn with_stage_delay(mut self, hop: usize, delay: StageDelay) -> Self {
        if let Some(slot) = self.stage_delays.get_mut(hop) {
            *slot = delay;
        }
        self
    }

    /// Same delay for every hop.
    pub fn with_uniform_delay(mut self, delay: StageDelay) -> Self {
        self.stage_delays = [delay; CHANNEL_COUNT - 1];
        self
    }

    pub fn with_pulse_width_ms(mut self, width_ms: f64) -> Self {
        self.pulse_width_ms = width_ms;
        self
    }

    pub fn with_sample_period_ms(mut self, period_ms: f64) -> Self {
        self.sample_period_ms = period_ms;
        self
    }

    pub fn with_drop_rate(mut self, rate: f64) -> Self {
        self.drop_rate = rate;
        self
    }

    pub fn with_stray_rate(mut self, rate: f64) -> Self {
        self.stray_rate = rate;
        self
    }

    pub fn with_anomaly(mut self, anomaly: AnomalyConfig) -> Self {
        self.anomalies.push(anomaly);
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Capture length covered by the frames, in ms.
    pub fn duration_ms(&self) -> f64 {
        self.start_ms + self.frames as f64 * self.frame_period_ms
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        let positive = [
            ("frame_period_ms", self.frame_period_ms),
            ("pulse_width_ms", self.pulse_width_ms),
            ("sample_period_ms", self.sample_period_ms),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GeneratorError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !self.start_ms.is_finite() || self.start_ms < 0.0 {
            return Err(GeneratorError::InvalidConfig(format!(
                "start_ms must be >= 0, got {}",
                self.start_ms
            )));
        }
        if self.pulse_width_ms < self.sample_period_ms {
            return Err(GeneratorError::InvalidConfig(format!(
                "pulse width {} ms is shorter than the sample period {} ms",
                self.pulse_width_ms, self.sample_period_ms
            )));
        }
        if self.pulse_width_ms >= self.frame_period_ms {
            return Err(GeneratorError::InvalidConfig(
                "pulse width must be shorter than the frame period".to_string(),
            ));
        }
        for (name, rate) in [("drop_rate", self.drop_rate), ("stray_rate", self.stray_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(GeneratorError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }
        for delay in &self.stage_delays {
            if !delay.mean_ms.is_finite() || !delay.jitter_ms.is_finite() || delay.jitter_ms < 0.0
            {
                return Err(GeneratorError::InvalidConfig(format!(
                    "invalid stage delay {:?}",
                    delay
                )));
            }
        }
        for anomaly in &self.anomalies {
            match anomaly.anomaly_type {
                AnomalyType::DropEdge { .. } => {}
                AnomalyType::StrayEdge { offset_ms, .. } => {
                    if !offset_ms.is_finite() {
                        return Err(GeneratorError::InvalidConfig(format!(
                            "stray edge offset must be finite, got {}",
                            offset_ms
                        )));
                    }
                }
                AnomalyType::Glitch {
                    offset_ms,
                    width_ms,
                    ..
                } => {
                    // At least one sample high before, low during and high after the dip.
                    let min = self.sample_period_ms;
                    let fits = offset_ms >= min
                        && width_ms >= min
                        && offset_ms + width_ms + min <= self.pulse_width_ms;
                    if !fits {
                        return Err(GeneratorError::InvalidConfig(format!(
                            "glitch at {} ms for {} ms does not fit a {} ms pulse",
                            offset_ms, width_ms, self.pulse_width_ms
                        )));
                    }
                }
            }
        }
        let samples = self.latest_pulse_end_ms() / self.sample_period_ms;
        if samples > MAX_SAMPLES as f64 {
            return Err(GeneratorError::InvalidConfig(format!(
                "capture would need about {:.0} samples, more than {}",
                samples, MAX_SAMPLES
            )));
        }
        Ok(())
    }

    /// Bound on the end of the last pulse, with stage jitter up to six sigma.
    fn latest_pulse_end_ms(&self) -> f64 {
        let chain: f64 = self
            .stage_delays
            .iter()
            .map(|d| d.mean_ms.max(0.0) + 6.0 * d.jitter_ms)
            .sum();
        let last_anchor = frame_anchor(self, self.frames.saturating_sub(1));
        let mut end = last_anchor + chain.max(self.frame_period_ms);
        for anomaly in &self.anomalies {
            if let AnomalyType::StrayEdge { offset_ms, .. } = anomaly.anomaly_type {
                if anomaly.frame < self.frames {
                    end = end.max(frame_anchor(self, anomaly.frame) + offset_ms);
                }
            }
        }
        end + self.pulse_width_ms
    }
}

/// Generate a sampled capture from configuration.
pub fn generate_capture(config: &GeneratorConfig) -> Result<GeneratedCapture, GeneratorError> {
    config.validate()?;

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let delays = config
        .stage_delays
        .iter()
        .map(|d| Normal::new(d.mean_ms, d.jitter_ms))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GeneratorError::InvalidConfig(e.to_string()))?;

    // High spans `(rise, fall)` per channel, in ms.
    let mut pulses: [Vec<(f64, f64)>; CHANNEL_COUNT] = Default::default();
    let width = config.pulse_width_ms;
    let mut intended = Vec::with_capacity(config.frames);

    for k in 0..config.frames {
        let anchor = frame_anchor(config, k);
        let mut t = anchor;
        let mut stamps = [None; CHANNEL_COUNT];

        for channel in ChannelIndex::all() {
            if channel.index() > 0 {
                t += delays[channel.index() - 1].sample(&mut rng).max(0.0);
            }
            let dropped = config.anomalies.iter().any(|a| a.drops(k, channel))
                || (config.drop_rate > 0.0 && rng.gen_bool(config.drop_rate));
            if !dropped {
                let channel_pulses = &mut pulses[channel.index()];
                match config.anomalies.iter().find_map(|a| a.dip(k, channel)) {
                    Some((offset_ms, width_ms)) => {
                        channel_pulses.push((t, t + offset_ms));
                        channel_pulses.push((t + offset_ms + width_ms, t + width));
                    }
                    None => channel_pulses.push((t, t + width)),
                }
                stamps[channel.index()] = Some(t);
            }
        }

        if config.stray_rate > 0.0 {
            for channel_pulses in pulses.iter_mut() {
                if rng.gen_bool(config.stray_rate) {
                    let t = anchor + rng.gen_range(0.0..config.frame_period_ms);
                    channel_pulses.push((t, t + width));
                }
            }
        }

        intended.push(stamps);
    }

    for anomaly in &config.anomalies {
        if let AnomalyType::StrayEdge { channel, offset_ms } = anomaly.anomaly_type {
            if anomaly.frame < config.frames {
                let t = frame_anchor(config, anomaly.frame) + offset_ms;
                pulses[channel.index()].push((t, t + width));
            }
        }
    }

    let grid = Grid {
        period_ms: config.sample_period_ms,
    };
    let spans: [Vec<(usize, usize)>; CHANNEL_COUNT] = std::array::from_fn(|i| {
        let mut channel_pulses = pulses[i].clone();
        channel_pulses.sort_by(|a, b| a.0.total_cmp(&b.0));
        channel_pulses
            .into_iter()
            .map(|(rise, fall)| {
                let first = grid.row_at_or_after(rise);
                let end = grid.row_at_or_after(fall).max(first + 1);
                (first, end)
            })
            .collect()
    });

    let truth = intended
        .into_iter()
        .map(|stamps| FrameTruth {
            stamps: stamps.map(|t| t.map(|t| grid.time(grid.row_at_or_after(t)))),
        })
        .collect();

    let rows = spans
        .iter()
        .flatten()
        .map(|&(_, end)| end)
        .max()
        .unwrap_or(0)
        .max(grid.row_at_or_after(config.duration_ms()))
        + 1;

    Ok(GeneratedCapture {
        samples: rasterize(&spans, rows, &grid),
        truth,
        sample_period_ms: config.sample_period_ms,
        seed: config.seed,
    })
}

fn frame_anchor(config: &GeneratorConfig, frame: usize) -> f64 {
    config.start_ms + frame as f64 * config.frame_period_ms
}

/// Uniform sampling grid starting at 0 ms.
struct Grid {
    period_ms: f64,
}

impl Grid {
    fn row_at_or_after(&self, t: f64) -> usize {
        // Tolerance keeps exact multiples of the period on their own row.
        ((t / self.period_ms) - 1e-9).ceil().max(0.0) as usize
    }

    fn time(&self, row: usize) -> f64 {
        row as f64 * self.period_ms
    }
}

/// Sample levels row by row; `spans` are sorted `[first, end)` row ranges.
fn rasterize(
    spans: &[Vec<(usize, usize)>; CHANNEL_COUNT],
    rows: usize,
    grid: &Grid,
) -> Vec<Sample> {
    let mut cursors = [0usize; CHANNEL_COUNT];
    (0..rows)
        .map(|row| {
            let levels = std::array::from_fn(|i| {
                let channel = &spans[i];
                while cursors[i] < channel.len() && channel[cursors[i]].1 <= row {
                    cursors[i] += 1;
                }
                channel.get(cursors[i]).map_or(false, |&(first, _)| first <= row)
            });
            Sample::new(grid.time(row), levels)
        })
        .collect()
}
