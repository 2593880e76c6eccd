//! Frame alignment tests.
//!
//! These tests verify:
//! - Reconstruction of regular captures
//! - Tolerance of missing and stray edges
//! - Ordering, window and consumption properties on randomized captures

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stage_latency::{
    AlignerConfig, AlignerState, ChannelIndex, EdgeSet, Frame, FrameAligner, Step, CHANNEL_COUNT,
};

fn ch(i: usize) -> ChannelIndex {
    ChannelIndex::new(i).unwrap()
}

/// Frame k has channel i at k * period + i * 10.
fn regular_channels(frames: usize, period: f64) -> [Vec<f64>; CHANNEL_COUNT] {
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
fn test_regular_frames_all_complete() {
    let edges = EdgeSet::from_channels(regular_channels(12, 100.0));
    let frames = FrameAligner::new(AlignerConfig::default())
        .unwrap()
        .align(&edges)
        .frames;

    assert_eq!(frames.len(), 12);
    for (k, frame) in frames.iter().enumerate() {
        assert!(frame.is_complete());
        assert_eq!(frame.t1(), Some(k as f64 * 100.0));
        assert_eq!(frame.latency(ch(0), ch(7)), Some(70.0));
    }
}

#[test]
fn test_missing_edge_drops_whole_frame() {
    let mut channels = regular_channels(3, 1000.0);
    channels[3].remove(1); // T4 of the second frame never fires
    let edges = EdgeSet::from_channels(channels);

    let frames = FrameAligner::default().align(&edges).frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].t1(), Some(0.0));
    assert_eq!(frames[1].t1(), Some(2000.0));

    // T1..T3 edges of the dropped frame are not reused.
    for frame in &frames {
        for i in 0..3 {
            assert_ne!(frame.get(ch(i)), Some(1000.0 + i as f64 * 10.0));
        }
    }
    assert_eq!(frames[1].get(ch(1)), Some(2010.0));
    assert_eq!(frames[1].get(ch(2)), Some(2020.0));
}

#[test]
fn test_empty_channel_yields_no_frames() {
    for empty in 0..CHANNEL_COUNT {
        let mut channels = regular_channels(5, 100.0);
        channels[empty].clear();
        let alignment = FrameAligner::default().align(&EdgeSet::from_channels(channels));
        assert!(alignment.frames.is_empty(), "channel {} empty", empty);
    }
}

#[test]
fn test_empty_later_channel_exhausts_anchor() {
    let mut channels = regular_channels(5, 100.0);
    channels[7].clear();
    let alignment = FrameAligner::default().align(&EdgeSet::from_channels(channels));
    assert_eq!(alignment.report.rejected_anchors, 5);
    assert_eq!(alignment.report.failures_by_channel[7], 5);
}

#[test]
fn test_stray_edge_is_skipped() {
    let mut channels = regular_channels(4, 100.0);
    // Stray T6 pulse between T4 and T5 of frame 2; stale once T5 is accepted.
    channels[5].insert(2, 235.0);
    let edges = EdgeSet::from_channels(channels);

    let alignment = FrameAligner::default().align(&edges);
    assert_eq!(alignment.frames.len(), 4);
    assert_eq!(alignment.frames[2].get(ch(5)), Some(250.0));
    assert_eq!(alignment.report.stale_edges[5], 1);
    assert!(alignment.frames.iter().all(|f| f.latency(ch(0), ch(7)) == Some(70.0)));
}

#[test]
fn test_extra_anchor_edges_are_rejected() {
    let mut channels = regular_channels(3, 1000.0);
    channels[0].insert(1, 500.0);
    let alignment = FrameAligner::default().align(&EdgeSet::from_channels(channels));
    assert_eq!(alignment.frames.len(), 3);
    assert_eq!(alignment.report.rejected_anchors, 1);
    assert_eq!(alignment.report.unmatched_edges[0], 1);
}

#[test]
fn test_no_anchor_edges() {
    let mut channels = regular_channels(3, 100.0);
    channels[0].clear();
    let edges = EdgeSet::from_channels(channels);
    let mut state = AlignerState::new();
    assert_eq!(state.step(&edges, &AlignerConfig::default()), None);
}

#[test]
fn test_gap_exceeded_between_middle_stages() {
    let mut channels = regular_channels(2, 1000.0);
    // Second half of frame 0 runs 200.5 ms after T4.
    for channel in channels.iter_mut().skip(4) {
        channel[0] += 190.5;
    }
    let aligner = FrameAligner::new(AlignerConfig::with_max_frame_gap(200.0)).unwrap();
    let alignment = aligner.align(&EdgeSet::from_channels(channels.clone()));
    assert_eq!(alignment.frames.len(), 1);
    assert_eq!(alignment.report.failures_by_channel[4], 1);

    let wider = FrameAligner::new(AlignerConfig::with_max_frame_gap(201.0)).unwrap();
    assert_eq!(wider.align(&EdgeSet::from_channels(channels)).frames.len(), 2);
}

#[test]
fn test_stepwise_matches_batch() {
    let mut channels = regular_channels(6, 1000.0);
    channels[2].remove(3);
    let edges = EdgeSet::from_channels(channels);
    let config = AlignerConfig::default();

    let mut state = AlignerState::new();
    let mut emitted = Vec::new();
    let mut rejected = 0;
    while let Some(step) = state.step(&edges, &config) {
        match step {
            Step::Emitted(frame) => emitted.push(frame),
            Step::Rejected { failed_channel, .. } => {
                assert_eq!(failed_channel, ch(2));
                rejected += 1;
            }
        }
    }
    assert_eq!(rejected, 1);
    assert_eq!(emitted, FrameAligner::default().align(&edges).frames);
}

// ===========================================================================
// Randomized properties
// ===========================================================================

/// Noisy capture: jittered stage delays, random drops and random stray edges.
fn random_channels(rng: &mut StdRng, frames: usize) -> [Vec<f64>; CHANNEL_COUNT] {
    let mut channels: [Vec<f64>; CHANNEL_COUNT] = Default::default();
    for k in 0..frames {
        let mut t = k as f64 * 150.0 + rng.gen_range(0.0..20.0);
        for channel in channels.iter_mut() {
            if rng.gen_bool(0.9) {
                channel.push(t);
            }
            if rng.gen_bool(0.05) {
                channel.push(t + rng.gen_range(-40.0..40.0));
            }
            t += rng.gen_range(0.0..60.0);
        }
    }
    for channel in channels.iter_mut() {
        channel.sort_by(f64::total_cmp);
        channel.dedup();
    }
    channels
}

fn edge_position(seq: &[f64], t: f64) -> Option<usize> {
    seq.iter().position(|&e| e == t)
}

#[test]
fn test_random_frames_are_ordered_and_windowed() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let config = AlignerConfig::with_max_frame_gap(50.0);
    let aligner = FrameAligner::new(config.clone()).unwrap();

    for _ in 0..50 {
        let edges = EdgeSet::from_channels(random_channels(&mut rng, 40));
        let frames = aligner.align(&edges).frames;

        for frame in &frames {
            let present: Vec<f64> = frame.stamps.iter().flatten().copied().collect();
            for pair in present.windows(2) {
                assert!(pair[0] <= pair[1], "out of order: {:?}", frame);
                assert!(pair[1] - pair[0] <= config.max_frame_gap);
            }
        }
    }
}

#[test]
fn test_random_frames_never_share_edges() {
    let mut rng = StdRng::seed_from_u64(42);
    let aligner = FrameAligner::default();

    for _ in 0..50 {
        let edges = EdgeSet::from_channels(random_channels(&mut rng, 40));
        let frames: Vec<Frame> = aligner.frames(&edges).collect();

        for c in ChannelIndex::all() {
            let seq = edges.channel(c);
            let positions: Vec<usize> = frames
                .iter()
                .map(|f| edge_position(seq, f.get(c).unwrap()).unwrap())
                .collect();
            // Strictly increasing positions: each edge used at most once, in order.
            assert!(positions.windows(2).all(|p| p[0] < p[1]));
        }
    }
}

#[test]
fn test_random_report_accounts_for_every_edge() {
    let mut rng = StdRng::seed_from_u64(7);
    let aligner = FrameAligner::default();

    for _ in 0..20 {
        let edges = EdgeSet::from_channels(random_channels(&mut rng, 30));
        let alignment = aligner.align(&edges);
        let counts = edges.counts();
        for i in 0..CHANNEL_COUNT {
            assert_eq!(
                alignment.report.unmatched_edges[i] + alignment.frames.len(),
                counts[i]
            );
            assert!(alignment.report.stale_edges[i] <= alignment.report.unmatched_edges[i]);
        }
        assert_eq!(
            alignment.report.rejected_anchors,
            alignment.report.failures_by_channel.iter().sum::<usize>()
        );
    }
}
