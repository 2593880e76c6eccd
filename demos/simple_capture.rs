//! Simple capture example
//!
//! Builds a small synthetic capture in memory, with one frame missing its
//! network-rx pulse, and prints the reconstructed frames and statistics.
//!
//! Run with: `cargo run --example simple_capture`

use stage_latency::{Analyzer, ChannelIndex, Sample, CHANNEL_COUNT};

/// Stage offsets from T1, in ms.
const OFFSETS: [f64; CHANNEL_COUNT] = [0.0, 4.0, 9.5, 11.0, 19.0, 21.0, 24.5, 31.0];

fn main() {
    println!("=== Stage Latency Simple Capture Example ===\n");

    let frames = 6;
    let period = 250.0;
    let step = 0.5;

    let mut samples = Vec::new();
    let mut t = 0.0;
    while t < frames as f64 * period {
        let k = (t / period) as usize;
        let phase = t - k as f64 * period;
        let levels = std::array::from_fn(|i| {
            // Frame 3 loses its T5 pulse
            let dropped = k == 3 && i == 4;
            !dropped && phase >= OFFSETS[i] && phase < OFFSETS[i] + 1.0
        });
        samples.push(Sample::new(t, levels));
        t += step;
    }

    let analysis = Analyzer::default().analyze(&samples);

    println!("Samples: {}", samples.len());
    for channel in ChannelIndex::all() {
        let d = channel.descriptor();
        println!(
            "  {} ({} {}, {}): {} edges",
            channel,
            d.role,
            d.pin,
            d.event,
            analysis.edges.channel(channel).len()
        );
    }

    println!("\nFrames: {} ({} anchors rejected)\n", analysis.frames.len(), analysis.report.rejected_anchors);
    for (i, frame) in analysis.frames.iter().enumerate() {
        let cells: Vec<String> = frame
            .stamps
            .iter()
            .map(|t| t.map_or("-".to_string(), |t| format!("{:.1}", t)))
            .collect();
        println!("{:>3}  {}", i + 1, cells.join("  "));
    }

    println!("\n{:<18} {:>6} {:>8} {:>8}", "Interval", "Count", "Mean", "Std");
    println!("{}", "-".repeat(44));
    for summary in &analysis.intervals {
        match summary.stats {
            Some(s) => println!(
                "{:<18} {:>6} {:>8.3} {:>8.3}",
                summary.definition.label, s.count, s.mean, s.std_dev
            ),
            None => println!("{:<18} no data", summary.definition.label),
        }
    }
}
