// Stage Latency CLI - Capture analysis front end
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # stage-latency
//!
//! Per-stage latency analysis of 8-channel logic-analyzer captures.
//!
//! ## Usage
//!
//! ```bash
//! # Print frame and latency tables
//! stage-latency analyze -i audio_test.csv
//!
//! # Also save a markdown report and the full analysis as JSON
//! stage-latency analyze -i audio_test.csv -o results.md --json results.json
//!
//! # Generate a synthetic capture to try it on
//! stage-latency generate -o synthetic.csv --frames 200 --seed 42
//! ```

use clap::{Parser, Subcommand};
use stage_latency_cli::commands::{run_analyze, run_generate, AnalyzeOptions, GenerateOptions};
use stage_latency_cli::report::DEFAULT_REPORT_FRAMES;
use stage_latency_testdata::{CsvLayout, GeneratorConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Stage latency analyzer for PPK2-style digital captures
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct frames from a capture and report interval latencies
    Analyze {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output markdown file for results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the full analysis as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Analysis configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum gap between consecutive stages of a frame, in ms
        #[arg(long)]
        max_frame_gap: Option<f64>,

        /// Frames listed in the markdown report
        #[arg(long, default_value_t = DEFAULT_REPORT_FRAMES)]
        frames_in_report: usize,

        /// Verbose/debug output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a synthetic capture with known frame timings
    Generate {
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of frames
        #[arg(long, default_value = "100")]
        frames: usize,

        /// Time between frames, in ms
        #[arg(long, default_value = "100.0")]
        period_ms: f64,

        /// Sampling period of the simulated analyzer, in ms
        #[arg(long, default_value = "0.1")]
        sample_period_ms: f64,

        /// Probability that a stage pulse is lost
        #[arg(long, default_value = "0.0")]
        drop_rate: f64,

        /// Probability of an extra pulse per frame and channel
        #[arg(long, default_value = "0.0")]
        stray_rate: f64,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write a single D0-D7 bit-string column
        #[arg(long)]
        packed: bool,

        /// Also write a JSON manifest with the intended timings
        #[arg(long)]
        manifest: bool,
    },
}

fn init_tracing(log_level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        };
        let level = if verbose { level.max(Level::DEBUG) } else { level };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    let verbose = matches!(args.command, Command::Analyze { verbose: true, .. });
    init_tracing(&args.log_level, verbose);

    info!("stage-latency v{}", env!("CARGO_PKG_VERSION"));

    let result = match args.command {
        Command::Analyze {
            input,
            output,
            json,
            config,
            max_frame_gap,
            frames_in_report,
            verbose,
        } => {
            let options = AnalyzeOptions {
                input,
                output,
                json,
                config,
                max_frame_gap,
                frames_in_report,
                verbose,
            };
            run_analyze(&options, &mut std::io::stdout().lock()).map(|_| ())
        }
        Command::Generate {
            output,
            frames,
            period_ms,
            sample_period_ms,
            drop_rate,
            stray_rate,
            seed,
            packed,
            manifest,
        } => {
            let mut generator = GeneratorConfig::new()
                .with_frames(frames)
                .with_frame_period_ms(period_ms)
                .with_sample_period_ms(sample_period_ms)
                .with_drop_rate(drop_rate)
                .with_stray_rate(stray_rate);
            if let Some(seed) = seed {
                generator = generator.with_seed(seed);
            }
            let options = GenerateOptions {
                output,
                generator,
                layout: if packed {
                    CsvLayout::Packed
                } else {
                    CsvLayout::Separate
                },
                manifest,
            };
            run_generate(&options).map(|capture| {
                println!(
                    "Wrote {} samples, {} frames to {}",
                    capture.samples.len(),
                    capture.truth.len(),
                    options.output.display()
                );
            })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
