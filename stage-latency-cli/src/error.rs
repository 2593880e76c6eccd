// Stage Latency CLI - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Top-level error for the command-line front end.

use crate::capture::CaptureError;
use crate::report::ReportError;
use stage_latency::LatencyError;
use stage_latency_testdata::GeneratorError;
use thiserror::Error;

/// Anything that can make a subcommand fail.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Config(#[from] LatencyError),

    #[error("Failed to load config {path}: {reason}")]
    ConfigFile { path: String, reason: String },

    #[error("Capture generation failed: {0}")]
    Generate(#[from] GeneratorError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
