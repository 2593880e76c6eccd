// Stage Latency Testdata - Capture structures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Generated captures and their CSV/JSON export.
//!
//! CSV files use the layout of PPK2 digital-channel exports: a
//! `Timestamp(ms)` column followed by either `D0`..`D7` columns or a single
//! `D0-D7` bit-string column.

use crate::generator::GeneratorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stage_latency::{ChannelIndex, Sample, CHANNEL_COUNT};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Channel column layout of an exported CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvLayout {
    /// One `D0`..`D7` column per channel.
    #[default]
    Separate,
    /// A single `D0-D7` column holding `0b` followed by eight bits, D0 first.
    Packed,
}

/// Where each stage pulse of a frame was placed, on the sampling grid.
///
/// `None` marks a dropped pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameTruth {
    pub stamps: [Option<f64>; CHANNEL_COUNT],
}

impl FrameTruth {
    pub fn is_complete(&self) -> bool {
        self.stamps.iter().all(Option::is_some)
    }

    pub fn latency(&self, from: ChannelIndex, to: ChannelIndex) -> Option<f64> {
        Some(self.stamps[to.index()]? - self.stamps[from.index()]?)
    }
}

/// A generated capture plus what went into it.
#[derive(Debug, Clone)]
pub struct GeneratedCapture {
    pub samples: Vec<Sample>,
    pub truth: Vec<FrameTruth>,
    pub sample_period_ms: f64,
    pub seed: Option<u64>,
}

/// JSON sidecar describing a generated capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureManifest {
    pub generated_at: DateTime<Utc>,
    pub frames: usize,
    pub expected_frames: usize,
    pub samples: usize,
    pub sample_period_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub truth: Vec<FrameTruth>,
}

impl GeneratedCapture {
    /// Frames whose eight pulses were all emitted.
    ///
    /// This is the number of frames an aligner should recover as long as
    /// the frame period is longer than its gap window and no stray pulse
    /// lands inside a frame.
    pub fn expected_frames(&self) -> usize {
        self.truth.iter().filter(|t| t.is_complete()).count()
    }

    /// Capture duration in ms.
    pub fn duration_ms(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    pub fn manifest(&self) -> CaptureManifest {
        CaptureManifest {
            generated_at: Utc::now(),
            frames: self.truth.len(),
            expected_frames: self.expected_frames(),
            samples: self.samples.len(),
            sample_period_ms: self.sample_period_ms,
            seed: self.seed,
            truth: self.truth.clone(),
        }
    }

    /// Write the capture as CSV.
    pub fn write_csv<W: Write>(&self, writer: W, layout: CsvLayout) -> Result<(), GeneratorError> {
        let mut writer = BufWriter::new(writer);

        // Header
        write!(writer, "Timestamp(ms)")?;
        match layout {
            CsvLayout::Separate => {
                for i in 0..CHANNEL_COUNT {
                    write!(writer, ",D{}", i)?;
                }
            }
            CsvLayout::Packed => write!(writer, ",D0-D7")?,
        }
        writeln!(writer)?;

        // Data rows
        for sample in &self.samples {
            write!(writer, "{}", sample.timestamp_ms)?;
            match layout {
                CsvLayout::Separate => {
                    for &level in &sample.levels {
                        write!(writer, ",{}", u8::from(level))?;
                    }
                }
                CsvLayout::Packed => {
                    write!(writer, ",0b")?;
                    for &level in &sample.levels {
                        write!(writer, "{}", u8::from(level))?;
                    }
                }
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export to a CSV file.
    pub fn to_csv(&self, path: impl AsRef<Path>, layout: CsvLayout) -> Result<(), GeneratorError> {
        self.write_csv(File::create(path)?, layout)
    }

    /// Export the manifest as pretty JSON.
    pub fn write_manifest(&self, path: impl AsRef<Path>) -> Result<(), GeneratorError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.manifest())?;
        Ok(())
    }
}
