// Stage Latency CLI - Capture ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reading logic-analyzer CSV exports into sample tables.
//!
//! Two layouts are understood, both with a `Timestamp(ms)` column:
//! eight `D0`..`D7` columns, or a single `D0-D7` bit string (`0b` prefix
//! optional, D0 first). When a file carries both, the separate columns are
//! used.

use stage_latency::{LatencyError, Sample, CHANNEL_COUNT};
use stage_latency_testdata::CsvLayout;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the timestamp column.
pub const TIMESTAMP_COLUMN: &str = "Timestamp(ms)";
/// Name of the packed channel column.
pub const PACKED_COLUMN: &str = "D0-D7";

/// Capture reading errors.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing '{}' column", TIMESTAMP_COLUMN)]
    MissingTimestamp,

    #[error("CSV must have D0..D7 columns or a '{}' binary string column", PACKED_COLUMN)]
    MissingChannels,

    #[error("No valid samples in capture ({skipped} rows skipped)")]
    Empty { skipped: usize },
}

/// A parsed capture.
#[derive(Debug, Clone)]
pub struct Capture {
    pub samples: Vec<Sample>,
    pub layout: CsvLayout,
    /// Rows dropped because they could not be parsed.
    pub skipped_rows: usize,
    /// Rows whose timestamp went backwards.
    pub out_of_order_rows: usize,
}

#[derive(Debug, Error)]
enum RowError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("invalid timestamp '{0}'")]
    Timestamp(String),

    #[error("invalid level '{0}'")]
    Level(String),

    #[error(transparent)]
    Sample(#[from] LatencyError),
}

#[derive(Debug, Clone, Copy)]
enum ChannelColumns {
    Separate([usize; CHANNEL_COUNT]),
    Packed(usize),
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp: usize,
    channels: ChannelColumns,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CaptureError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let timestamp = position(TIMESTAMP_COLUMN).ok_or(CaptureError::MissingTimestamp)?;

        let mut separate = [0usize; CHANNEL_COUNT];
        let mut all_separate = true;
        for (i, slot) in separate.iter_mut().enumerate() {
            match position(format!("D{}", i).as_str()) {
                Some(p) => *slot = p,
                None => {
                    all_separate = false;
                    break;
                }
            }
        }

        let channels = if all_separate {
            ChannelColumns::Separate(separate)
        } else {
            ChannelColumns::Packed(position(PACKED_COLUMN).ok_or(CaptureError::MissingChannels)?)
        };

        Ok(Self {
            timestamp,
            channels,
        })
    }

    fn layout(&self) -> CsvLayout {
        match self.channels {
            ChannelColumns::Separate(_) => CsvLayout::Separate,
            ChannelColumns::Packed(_) => CsvLayout::Packed,
        }
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<Sample, RowError> {
        let field = |idx: usize, name: &'static str| {
            record.get(idx).ok_or(RowError::MissingField(name))
        };

        let raw = field(self.timestamp, TIMESTAMP_COLUMN)?;
        let timestamp_ms: f64 = raw
            .parse()
            .map_err(|_| RowError::Timestamp(raw.to_string()))?;
        if !timestamp_ms.is_finite() {
            return Err(RowError::Timestamp(raw.to_string()));
        }

        match self.channels {
            ChannelColumns::Separate(columns) => {
                let mut bits = [0u8; CHANNEL_COUNT];
                for (bit, &idx) in bits.iter_mut().zip(columns.iter()) {
                    let raw = field(idx, "D0..D7")?;
                    *bit = raw.parse().map_err(|_| RowError::Level(raw.to_string()))?;
                }
                Ok(Sample::from_bits(timestamp_ms, &bits)?)
            }
            ChannelColumns::Packed(idx) => {
                Ok(Sample::from_bit_string(timestamp_ms, field(idx, PACKED_COLUMN)?)?)
            }
        }
    }
}

/// Read a capture file.
pub fn read_capture(path: impl AsRef<Path>) -> Result<Capture, CaptureError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| CaptureError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let capture = read_capture_from(file)?;
    info!(
        "Parsed {} samples from {} ({:?} layout)",
        capture.samples.len(),
        path.display(),
        capture.layout
    );
    Ok(capture)
}

/// Read a capture from any CSV source.
///
/// Malformed rows are skipped with a warning. I/O failures abort.
pub fn read_capture_from<R: Read>(reader: R) -> Result<Capture, CaptureError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::locate(reader.headers()?)?;
    debug!("Capture columns: {:?}", columns);

    let mut samples = Vec::new();
    let mut skipped_rows = 0;
    let mut out_of_order_rows = 0;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping row: {}", e);
                skipped_rows += 1;
                continue;
            }
        };

        match columns.parse(&record) {
            Ok(sample) => {
                if let Some(prev) = samples.last().map(|s: &Sample| s.timestamp_ms) {
                    if sample.timestamp_ms < prev {
                        out_of_order_rows += 1;
                    }
                }
                samples.push(sample);
            }
            Err(e) => {
                let line = record.position().map_or(0, |p| p.line());
                warn!("Skipping row at line {}: {}", line, e);
                skipped_rows += 1;
            }
        }
    }

    if samples.is_empty() {
        return Err(CaptureError::Empty {
            skipped: skipped_rows,
        });
    }
    if out_of_order_rows > 0 {
        warn!(
            "{} rows have timestamps earlier than the previous row",
            out_of_order_rows
        );
    }

    Ok(Capture {
        samples,
        layout: columns.layout(),
        skipped_rows,
        out_of_order_rows,
    })
}
