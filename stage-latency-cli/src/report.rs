// Stage Latency CLI - Report rendering
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Console, markdown and JSON renderings of an [`Analysis`].

use chrono::{DateTime, Utc};
use stage_latency::{Analysis, ChannelIndex, Frame, IntervalSummary, LatencyStats};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::capture::Capture;

/// Frames listed in the markdown report unless told otherwise.
pub const DEFAULT_REPORT_FRAMES: usize = 10;

/// Report output errors.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn fmt_ms(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "-".to_string(),
    }
}

fn table_header(out: &mut String, columns: &[String]) {
    out.push_str(&format!("| {} |\n", columns.join(" | ")));
    out.push_str(&format!("|{}|\n", vec!["---"; columns.len()].join("|")));
}

fn timestamp_row(out: &mut String, number: usize, frame: &Frame, decimals: usize) {
    let cells: Vec<String> = frame
        .stamps
        .iter()
        .map(|&t| fmt_ms(t, decimals))
        .collect();
    out.push_str(&format!("| {} | {} |\n", number, cells.join(" | ")));
}

fn channel_columns() -> Vec<String> {
    std::iter::once("Frame".to_string())
        .chain(ChannelIndex::all().map(|c| c.label().to_string()))
        .collect()
}

fn interval_heading(summary: &IntervalSummary) -> String {
    format!("{} ({})", summary.definition.label, summary.definition.span())
}

/// Frame-by-frame timing points, per-frame latencies with Max/Min/Average
/// rows, and an interval statistics table.
pub fn render_console(analysis: &Analysis) -> String {
    let mut out = String::new();

    out.push_str("### Frame-by-Frame Timing Points Table (Unit: ms)\n");
    table_header(&mut out, &channel_columns());
    for (i, frame) in analysis.frames.iter().enumerate() {
        timestamp_row(&mut out, i + 1, frame, 2);
    }

    out.push_str("\n---\n\n### Latency Table (Unit: ms)\n");
    let columns: Vec<String> = std::iter::once("Frame".to_string())
        .chain(
            analysis
                .intervals
                .iter()
                .map(|s| format!("{} ({})", s.definition.span(), s.definition.label)),
        )
        .collect();
    table_header(&mut out, &columns);
    for (i, frame) in analysis.frames.iter().enumerate() {
        let cells: Vec<String> = analysis
            .intervals
            .iter()
            .map(|s| fmt_ms(s.definition.latency(frame), 2))
            .collect();
        out.push_str(&format!("| {} | {} |\n", i + 1, cells.join(" | ")));
    }

    let summary_rows: [(&str, fn(&LatencyStats) -> f64); 3] = [
        ("Max", |s| s.max),
        ("Min", |s| s.min),
        ("Average", |s| s.mean),
    ];
    for (label, pick) in summary_rows {
        let cells: Vec<String> = analysis
            .intervals
            .iter()
            .map(|s| fmt_ms(s.stats.as_ref().map(pick), 2))
            .collect();
        out.push_str(&format!("| **{}** | {} |\n", label, cells.join(" | ")));
    }

    out.push_str("\n---\n\n### Interval Statistics (Unit: ms)\n");
    table_header(
        &mut out,
        &["Interval", "Count", "Mean", "Median", "Min", "Max", "Std"].map(String::from),
    );
    for summary in &analysis.intervals {
        let heading = interval_heading(summary);
        match &summary.stats {
            Some(s) => {
                out.push_str(&format!(
                    "| {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
                    heading, s.count, s.mean, s.median, s.min, s.max, s.std_dev
                ));
            }
            None => {
                out.push_str(&format!("| {} | 0 | - | - | - | - | - |\n", heading));
            }
        }
    }

    out
}

/// Per-channel edge counts and alignment accounting for `--verbose`.
pub fn render_diagnostics(capture: &Capture, analysis: &Analysis) -> String {
    let mut out = String::new();
    let report = &analysis.report;

    out.push_str(&format!(
        "Parsed {} samples ({:?} layout, {} rows skipped, {} out of order).\n",
        capture.samples.len(),
        capture.layout,
        capture.skipped_rows,
        capture.out_of_order_rows
    ));
    for channel in ChannelIndex::all() {
        let d = channel.descriptor();
        let i = channel.index();
        out.push_str(&format!(
            "D{} ({}, {} {}, {}): {} rising edges, {} unmatched, {} stale, {} anchor failures\n",
            i,
            d.label,
            d.role,
            d.pin,
            d.event,
            analysis.edges.channel(channel).len(),
            report.unmatched_edges[i],
            report.stale_edges[i],
            report.failures_by_channel[i]
        ));
    }
    out.push_str(&format!(
        "Reconstructed {} frames ({} complete), {} anchor edges rejected.\n",
        report.frames,
        analysis.complete_frames(),
        report.rejected_anchors
    ));

    out
}

/// Markdown report: totals, one section per interval and the first
/// `frame_limit` frames.
pub fn render_markdown(
    analysis: &Analysis,
    frame_limit: usize,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    out.push_str("# WiFi Audio Latency Analysis Report\n\n");
    out.push_str(&format!(
        "_Generated {} by stage-latency v{}_\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        stage_latency::VERSION
    ));
    out.push_str(&format!("**Total frames:** {}\n\n", analysis.frames.len()));
    out.push_str(&format!(
        "**Complete frames (T1-T8):** {}\n\n",
        analysis.complete_frames()
    ));

    for summary in &analysis.intervals {
        out.push_str(&format!("## {}\n", interval_heading(summary)));
        match &summary.stats {
            Some(s) => {
                out.push_str("| Metric | Value (ms) |\n|---|---|\n");
                out.push_str(&format!("| Count | {} |\n", s.count));
                out.push_str(&format!("| Mean | {:.3} |\n", s.mean));
                out.push_str(&format!("| Median | {:.3} |\n", s.median));
                out.push_str(&format!("| Min | {:.3} |\n", s.min));
                out.push_str(&format!("| Max | {:.3} |\n", s.max));
                out.push_str(&format!("| Std | {:.3} |\n\n", s.std_dev));
            }
            None => out.push_str("No valid data.\n\n"),
        }
    }

    let shown = analysis.frames.len().min(frame_limit);
    out.push_str(&format!("## First {} Frames (Timestamps in ms)\n", shown));
    table_header(&mut out, &channel_columns());
    for (i, frame) in analysis.frames.iter().take(frame_limit).enumerate() {
        timestamp_row(&mut out, i + 1, frame, 3);
    }

    out
}

/// Write the markdown report to `path`.
pub fn write_markdown(
    path: &Path,
    analysis: &Analysis,
    frame_limit: usize,
) -> Result<(), ReportError> {
    let text = render_markdown(analysis, frame_limit, Utc::now());
    std::fs::write(path, text).map_err(io_error(path))
}

/// Write the full analysis as pretty JSON.
pub fn write_json(path: &Path, analysis: &Analysis) -> Result<(), ReportError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, analysis)?;
    writer.flush().map_err(io_error(path))
}
