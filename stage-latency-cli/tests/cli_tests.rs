//! Capture files through the analyze and generate drivers.

use stage_latency::{Analysis, ChannelIndex};
use stage_latency_cli::commands::{manifest_path, AnalyzeOptions, GenerateOptions};
use stage_latency_cli::{read_capture, run_analyze, run_generate, CaptureError, CliError};
use stage_latency_testdata::{generate_capture, AnomalyConfig, CsvLayout, GeneratorConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_capture(dir: &TempDir, config: &GeneratorConfig, layout: CsvLayout) -> std::path::PathBuf {
    let path = dir.path().join("capture.csv");
    generate_capture(config)
        .unwrap()
        .to_csv(&path, layout)
        .unwrap();
    path
}

fn analyze(options: &AnalyzeOptions) -> (Analysis, String) {
    let mut out: Vec<u8> = Vec::new();
    let analysis = run_analyze(options, &mut out).unwrap();
    (analysis, String::from_utf8(out).unwrap())
}

#[test]
fn test_analyze_separate_layout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_capture(
        &dir,
        &GeneratorConfig::new().with_frames(20).with_seed(1),
        CsvLayout::Separate,
    );

    let (analysis, console) = analyze(&AnalyzeOptions::new(&input));
    assert_eq!(analysis.frames.len(), 20);
    assert_eq!(analysis.complete_frames(), 20);
    assert!(console.contains("### Frame-by-Frame Timing Points Table (Unit: ms)"));
    assert!(console.contains("| **Average** |"));
    assert!(!console.contains("rising edges"));
}

#[test]
fn test_analyze_packed_layout_matches_separate() {
    let config = GeneratorConfig::new().with_frames(10).with_seed(2);
    let separate_dir = tempfile::tempdir().unwrap();
    let packed_dir = tempfile::tempdir().unwrap();
    let separate = write_capture(&separate_dir, &config, CsvLayout::Separate);
    let packed = write_capture(&packed_dir, &config, CsvLayout::Packed);

    let a = read_capture(&separate).unwrap();
    let b = read_capture(&packed).unwrap();
    assert_eq!(a.layout, CsvLayout::Separate);
    assert_eq!(b.layout, CsvLayout::Packed);
    assert_eq!(a.samples, b.samples);
}

#[test]
fn test_reports_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_capture(
        &dir,
        &GeneratorConfig::new().with_frames(15).with_seed(3),
        CsvLayout::Separate,
    );
    let markdown = dir.path().join("results.md");
    let json = dir.path().join("results.json");

    let mut options = AnalyzeOptions::new(&input);
    options.output = Some(markdown.clone());
    options.json = Some(json.clone());
    options.frames_in_report = 5;
    options.verbose = true;
    let (analysis, console) = analyze(&options);

    assert!(console.contains("D0 (T1, Gateway P0.26, audio capture): 15 rising edges"));
    assert!(console.contains("Results saved to"));

    let md = fs::read_to_string(&markdown).unwrap();
    assert!(md.contains("**Total frames:** 15"));
    assert!(md.contains("## First 5 Frames (Timestamps in ms)"));
    assert!(md.contains("## Network (T5-T4)\n| Metric | Value (ms) |"));

    let back: Analysis = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(back.frames, analysis.frames);
    assert_eq!(back.report, analysis.report);
}

#[test]
fn test_config_file_and_gap_override() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_capture(
        &dir,
        &GeneratorConfig::new()
            .with_frames(8)
            .with_frame_period_ms(1000.0)
            .with_sample_period_ms(0.5)
            .with_seed(4),
        CsvLayout::Separate,
    );
    let config = dir.path().join("analysis.json");
    fs::write(
        &config,
        r#"{ "intervals": [ { "label": "Gateway", "from": 0, "to": 3 } ] }"#,
    )
    .unwrap();

    let mut options = AnalyzeOptions::new(&input);
    options.config = Some(config);
    let (analysis, console) = analyze(&options);
    assert_eq!(analysis.intervals.len(), 1);
    assert_eq!(analysis.intervals[0].count(), 8);
    assert!(console.contains("T4-T1 (Gateway)"));

    // The default network hop alone takes about 8 ms.
    options.max_frame_gap = Some(0.5);
    let (narrow, _) = analyze(&options);
    assert!(narrow.frames.is_empty());
}

#[test]
fn test_dropped_edges_reduce_frames() {
    let dir = tempfile::tempdir().unwrap();
    let config = GeneratorConfig::new()
        .with_frames(10)
        .with_frame_period_ms(1000.0)
        .with_sample_period_ms(0.5)
        .with_anomaly(AnomalyConfig::drop_edge(4, ChannelIndex::T8))
        .with_anomaly(AnomalyConfig::drop_edge(7, ChannelIndex::T1))
        .with_seed(6);
    let input = write_capture(&dir, &config, CsvLayout::Packed);

    let (analysis, _) = analyze(&AnalyzeOptions::new(&input));
    assert_eq!(analysis.frames.len(), 8);
    assert_eq!(analysis.report.failures_by_channel[7], 1);
}

#[test]
fn test_invalid_inputs() {
    let dir = tempfile::tempdir().unwrap();

    let missing = AnalyzeOptions::new(dir.path().join("missing.csv"));
    assert!(matches!(
        run_analyze(&missing, &mut Vec::<u8>::new()),
        Err(CliError::Capture(CaptureError::Open { .. }))
    ));

    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "Timestamp(ms),D0-D7\nfoo,bar\n").unwrap();
    assert!(matches!(
        run_analyze(&AnalyzeOptions::new(&empty), &mut Vec::<u8>::new()),
        Err(CliError::Capture(CaptureError::Empty { skipped: 1 }))
    ));

    let mut bad_gap = AnalyzeOptions::new(&empty);
    bad_gap.max_frame_gap = Some(-1.0);
    let err = run_analyze(&bad_gap, &mut Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, CliError::Config(_)));
    let msg = err.to_string();
    assert!(msg.starts_with("Invalid configuration: "));
    assert_eq!(msg.matches("configuration").count(), 1);
}

#[test]
fn test_generate_writes_csv_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("synthetic.csv");
    let options = GenerateOptions {
        output: output.clone(),
        generator: GeneratorConfig::new().with_frames(5).with_seed(9),
        layout: CsvLayout::Packed,
        manifest: true,
    };
    let capture = run_generate(&options).unwrap();

    assert!(Path::new(&manifest_path(&output)).exists());
    let read = read_capture(&output).unwrap();
    assert_eq!(read.samples, capture.samples);
    assert_eq!(read.skipped_rows, 0);
}
