//! Example: Generate reference captures with and without anomalies.
//!
//! Run with: cargo run -p stage-latency-testdata --example generate_capture

use stage_latency::ChannelIndex;
use stage_latency_testdata::{
    generate_capture, AnomalyConfig, CsvLayout, GeneratorConfig, StageDelay,
};
use std::fs;

fn main() {
    println!("Stage Latency Capture Generator");
    println!("===============================\n");

    if let Err(e) = fs::create_dir_all("captures") {
        eprintln!("Could not create captures/: {}", e);
        return;
    }

    let scenarios = [
        (
            "clean_500",
            GeneratorConfig::new().with_frames(500).with_seed(42),
            CsvLayout::Separate,
        ),
        (
            "lossy_probe",
            GeneratorConfig::new()
                .with_frames(200)
                .with_frame_period_ms(1000.0)
                .with_sample_period_ms(0.5)
                .with_drop_rate(0.02)
                .with_seed(7),
            CsvLayout::Separate,
        ),
        (
            "congested_network",
            GeneratorConfig::new()
                .with_frames(300)
                .with_stage_delay(3, StageDelay::new(25.0, 9.0))
                .with_seed(3),
            CsvLayout::Packed,
        ),
        (
            "glitches",
            GeneratorConfig::new()
                .with_frames(50)
                .with_anomaly(AnomalyConfig::drop_edge(10, ChannelIndex::T8))
                .with_anomaly(AnomalyConfig::stray_edge(20, ChannelIndex::T1, 60.0))
                .with_seed(1),
            CsvLayout::Packed,
        ),
    ];

    for (name, config, layout) in scenarios {
        let capture = match generate_capture(&config) {
            Ok(capture) => capture,
            Err(e) => {
                eprintln!("  Skipping {}: {}", name, e);
                continue;
            }
        };

        let csv_path = format!("captures/{}.csv", name);
        if let Err(e) = capture.to_csv(&csv_path, layout) {
            eprintln!("  Warning: Could not save {}: {}", csv_path, e);
            continue;
        }

        let manifest_path = format!("captures/{}.manifest.json", name);
        if let Err(e) = capture.write_manifest(&manifest_path) {
            eprintln!("  Warning: Could not save manifest: {}", e);
        }

        println!(
            "  Created {} ({} samples, {}/{} complete frames)",
            csv_path,
            capture.samples.len(),
            capture.expected_frames(),
            capture.truth.len()
        );
    }
}
