// Stage Latency CLI - Subcommand drivers
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! `analyze` and `generate`, independent of argument parsing.

use crate::capture::read_capture;
use crate::error::{CliError, Result};
use crate::report::{self, DEFAULT_REPORT_FRAMES};
use stage_latency::{Analysis, AnalysisConfig, Analyzer};
use stage_latency_testdata::{generate_capture, CsvLayout, GeneratedCapture, GeneratorConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options of the `analyze` subcommand.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub config: Option<PathBuf>,
    /// Overrides the gap of the config file.
    pub max_frame_gap: Option<f64>,
    pub frames_in_report: usize,
    pub verbose: bool,
}

impl AnalyzeOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            json: None,
            config: None,
            max_frame_gap: None,
            frames_in_report: DEFAULT_REPORT_FRAMES,
            verbose: false,
        }
    }
}

/// Options of the `generate` subcommand.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output: PathBuf,
    pub generator: GeneratorConfig,
    pub layout: CsvLayout,
    /// Also write `<output>.manifest.json`.
    pub manifest: bool,
}

/// Load an analysis configuration from a JSON file.
///
/// Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let config_error = |reason: String| CliError::ConfigFile {
        path: path.display().to_string(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))
}

/// Analyze a capture file and write the reports it asks for.
///
/// The console report goes to `out`.
pub fn run_analyze(options: &AnalyzeOptions, out: &mut dyn Write) -> Result<Analysis> {
    let mut config = match &options.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(gap) = options.max_frame_gap {
        config.aligner.max_frame_gap = gap;
    }
    let analyzer = Analyzer::new(config)?;
    debug!(
        "Max frame gap {} ms, {} intervals",
        analyzer.aligner().config().max_frame_gap,
        analyzer.intervals().len()
    );

    let capture = read_capture(&options.input)?;
    if capture.skipped_rows > 0 {
        warn!("Skipped {} malformed rows", capture.skipped_rows);
    }

    let analysis = analyzer.analyze(&capture.samples);
    info!(
        "Reconstructed {} frames ({} complete)",
        analysis.frames.len(),
        analysis.complete_frames()
    );

    if options.verbose {
        writeln!(out, "{}", report::render_diagnostics(&capture, &analysis))?;
    }
    writeln!(out, "{}", report::render_console(&analysis))?;

    if let Some(path) = &options.output {
        report::write_markdown(path, &analysis, options.frames_in_report)?;
        writeln!(out, "Results saved to {}", path.display())?;
    }
    if let Some(path) = &options.json {
        report::write_json(path, &analysis)?;
        writeln!(out, "Analysis saved to {}", path.display())?;
    }

    Ok(analysis)
}

/// Path of the manifest written next to a generated capture.
pub fn manifest_path(output: &Path) -> PathBuf {
    output.with_extension("manifest.json")
}

/// Generate a synthetic capture and write it as CSV.
pub fn run_generate(options: &GenerateOptions) -> Result<GeneratedCapture> {
    let capture = generate_capture(&options.generator)?;
    capture.to_csv(&options.output, options.layout)?;
    info!(
        "Wrote {} samples ({} of {} frames complete) to {}",
        capture.samples.len(),
        capture.expected_frames(),
        capture.truth.len(),
        options.output.display()
    );

    if options.manifest {
        let path = manifest_path(&options.output);
        capture.write_manifest(&path)?;
        info!("Wrote manifest to {}", path.display());
    }

    Ok(capture)
}
