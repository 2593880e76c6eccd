//! Benchmarks for edge detection, frame alignment and interval statistics

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use stage_latency::{
    interval_statistics, Analyzer, EdgeSet, FrameAligner, IntervalDefinition, Sample,
    CHANNEL_COUNT,
};

/// Sampled capture of `frames` frames, 100 ms apart, stage i at +i*10 ms,
/// sampled every 0.5 ms with 1 ms pulses.
fn generate_capture(frames: usize) -> Vec<Sample> {
    let rows = frames * 200;
    (0..rows)
        .map(|r| {
            let t = r as f64 * 0.5;
            let phase = t % 100.0;
            let levels = std::array::from_fn(|i| {
                let start = i as f64 * 10.0;
                phase >= start && phase < start + 1.0
            });
            Sample::new(t, levels)
        })
        .collect()
}

/// Edge sequences with every 7th T5 edge missing and a stray T3 edge every 11 frames.
fn generate_edges(frames: usize) -> EdgeSet {
    let mut channels: [Vec<f64>; CHANNEL_COUNT] = Default::default();
    for k in 0..frames {
        let base = k as f64 * 100.0;
        for (i, channel) in channels.iter_mut().enumerate() {
            if i == 4 && k % 7 == 3 {
                continue;
            }
            if i == 2 && k % 11 == 5 {
                channel.push(base + 1.0);
            }
            channel.push(base + i as f64 * 10.0);
        }
    }
    EdgeSet::from_channels(channels)
}

fn bench_edge_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("edges");

    let samples = generate_capture(1000);
    group.throughput(Throughput::Elements(samples.len() as u64));

    group.bench_function("detect_200k_rows", |b| {
        b.iter(|| {
            let edges = EdgeSet::detect(&samples);
            black_box(edges);
        })
    });

    group.finish();
}

fn bench_alignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("alignment");

    let edges = generate_edges(10_000);
    let aligner = FrameAligner::default();
    group.throughput(Throughput::Elements(edges.total() as u64));

    group.bench_function("align_10k_frames", |b| {
        b.iter(|| {
            let alignment = aligner.align(&edges);
            black_box(alignment);
        })
    });

    group.bench_function("frames_iter_10k", |b| {
        b.iter(|| black_box(aligner.frames(&edges).count()))
    });

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    let frames = FrameAligner::default().align(&generate_edges(10_000)).frames;
    let intervals = IntervalDefinition::standard();

    group.bench_function("six_intervals_10k_frames", |b| {
        b.iter(|| black_box(interval_statistics(&frames, &intervals)))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let samples = generate_capture(500);
    let analyzer = Analyzer::default();

    group.bench_function("analyze_500_frames", |b| {
        b.iter(|| black_box(analyzer.analyze(&samples)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_edge_detection,
    bench_alignment,
    bench_statistics,
    bench_pipeline
);
criterion_main!(benches);
