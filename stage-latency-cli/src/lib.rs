// Stage Latency CLI - Capture analysis front end
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Building blocks of the `stage-latency` binary: CSV capture ingestion,
//! report rendering and the subcommand drivers.

pub mod capture;
pub mod commands;
pub mod error;
pub mod report;

pub use capture::{read_capture, read_capture_from, Capture, CaptureError};
pub use commands::{run_analyze, run_generate, AnalyzeOptions, GenerateOptions};
pub use error::{CliError, Result};
pub use report::{render_console, render_diagnostics, render_markdown, ReportError};
