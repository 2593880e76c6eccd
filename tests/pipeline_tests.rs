//! Pipeline tests: sample tables in, interval statistics out.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stage_latency::{
    channel_edges, interval_latencies, AlignerConfig, AnalysisConfig, Analyzer, ChannelIndex,
    IntervalDefinition, Sample, CHANNEL_COUNT,
};

/// Build a capture from per-channel pulse start times (1 ms wide pulses),
/// sampled every `step` ms.
fn capture_from_pulses(pulses: &[Vec<f64>; CHANNEL_COUNT], step: f64) -> Vec<Sample> {
    let end = pulses
        .iter()
        .flatten()
        .fold(0.0f64, |acc, &t| acc.max(t))
        + 5.0;
    let rows = (end / step).ceil() as usize;
    (0..rows)
        .map(|r| {
            let t = r as f64 * step;
            let levels = std::array::from_fn(|i| {
                pulses[i]
                    .iter()
                    .any(|&start| t >= start - 1e-9 && t < start + 1.0 - 1e-9)
            });
            Sample::new(t, levels)
        })
        .collect()
}

fn regular_pulses(frames: usize, period: f64) -> [Vec<f64>; CHANNEL_COUNT] {
    std::array::from_fn(|i| {
        (0..frames)
            .map(|k| k as f64 * period + i as f64 * 10.0)
            .collect()
    })
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn test_regular_capture_end_to_end() {
    let samples = capture_from_pulses(&regular_pulses(8, 100.0), 0.5);
    let analysis = Analyzer::default().analyze(&samples);

    assert_eq!(analysis.frames.len(), 8);
    assert_eq!(analysis.complete_frames(), 8);

    let e2e = analysis.interval("End-to-End").unwrap().stats.unwrap();
    assert_eq!(e2e.count, 8);
    assert_relative_eq!(e2e.mean, 70.0);
    assert_relative_eq!(e2e.median, 70.0);
    assert_relative_eq!(e2e.min, 70.0);
    assert_relative_eq!(e2e.max, 70.0);
    assert_eq!(e2e.std_dev, 0.0);

    for summary in &analysis.intervals[..5] {
        let stats = summary.stats.unwrap();
        assert_relative_eq!(stats.mean, 10.0);
    }
}

#[test]
fn test_missing_stage_drops_frame_from_all_intervals() {
    let mut pulses = regular_pulses(3, 1000.0);
    pulses[3].remove(1);
    let analysis = Analyzer::default().analyze(&capture_from_pulses(&pulses, 0.5));

    assert_eq!(analysis.frames.len(), 2);
    for summary in &analysis.intervals {
        assert_eq!(summary.count(), 2, "{}", summary.definition.label);
    }
}

#[test]
fn test_silent_channel_gives_no_data() {
    let mut pulses = regular_pulses(4, 100.0);
    pulses[6].clear();
    let analysis = Analyzer::default().analyze(&capture_from_pulses(&pulses, 0.5));

    assert!(analysis.frames.is_empty());
    assert_eq!(analysis.intervals.len(), 6);
    assert!(analysis.intervals.iter().all(|s| s.stats.is_none()));
}

#[test]
fn test_stray_pulse_does_not_shift_frames() {
    let mut pulses = regular_pulses(5, 100.0);
    pulses[5].push(233.0);
    pulses[5].sort_by(f64::total_cmp);
    let analysis = Analyzer::default().analyze(&capture_from_pulses(&pulses, 0.5));

    assert_eq!(analysis.frames.len(), 5);
    assert_eq!(analysis.report.stale_edges[5], 1);
    let decoding = analysis.interval("Decoding").unwrap().stats.unwrap();
    assert_relative_eq!(decoding.mean, 10.0);
}

#[test]
fn test_custom_intervals_and_gap() {
    let config = AnalysisConfig {
        aligner: AlignerConfig::with_max_frame_gap(15.0),
        intervals: vec![IntervalDefinition::new(
            "Gateway",
            ChannelIndex::T1,
            ChannelIndex::new(3).unwrap(),
        )],
    };
    let analyzer = Analyzer::new(config).unwrap();
    let analysis = analyzer.analyze(&capture_from_pulses(&regular_pulses(3, 100.0), 0.5));

    assert_eq!(analysis.intervals.len(), 1);
    assert_relative_eq!(analysis.intervals[0].stats.unwrap().mean, 30.0);
}

// ===========================================================================
// Properties
// ===========================================================================

fn random_samples(rng: &mut StdRng, rows: usize) -> Vec<Sample> {
    let mut t = 0.0;
    (0..rows)
        .map(|_| {
            t += rng.gen_range(0.01..2.0);
            let levels = std::array::from_fn(|_| rng.gen_bool(0.4));
            Sample::new(t, levels)
        })
        .collect()
}

#[test]
fn test_edges_bounded_and_at_rising_rows() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..30 {
        let samples = random_samples(&mut rng, 200);
        for channel in ChannelIndex::all() {
            let edges = channel_edges(&samples, channel);
            assert!(edges.len() <= samples.len() / 2 + 1);

            for t in edges {
                let row = samples.iter().position(|s| s.timestamp_ms == t).unwrap();
                assert!(samples[row].level(channel));
                assert!(row == 0 || !samples[row - 1].level(channel));
            }
        }
    }
}

#[test]
fn test_interval_counts_and_mean_bounds() {
    let mut rng = StdRng::seed_from_u64(99);
    let analyzer = Analyzer::default();
    for _ in 0..30 {
        let analysis = analyzer.analyze(&random_samples(&mut rng, 500));
        for summary in &analysis.intervals {
            let def = &summary.definition;
            let expected = analysis
                .frames
                .iter()
                .filter(|f| f.get(def.from).is_some() && f.get(def.to).is_some())
                .count();
            assert_eq!(summary.count(), expected);
            assert_eq!(
                interval_latencies(&analysis.frames, def).len(),
                expected
            );

            if let Some(stats) = summary.stats {
                assert!(stats.min <= stats.mean + 1e-9 && stats.mean <= stats.max + 1e-9);
                assert!(stats.min <= stats.median && stats.median <= stats.max);
                assert!(stats.std_dev >= 0.0);
            }
        }
    }
}
