//! End-to-end analysis: samples to edges to frames to interval statistics.

use crate::aligner::{AlignerConfig, AlignmentReport, FrameAligner};
use crate::edge::EdgeSet;
use crate::error::{LatencyError, Result};
use crate::frame::Frame;
use crate::interval::IntervalDefinition;
use crate::sample::Sample;
use crate::stats::{interval_statistics, IntervalSummary};
use serde::{Deserialize, Serialize};

/// Full analysis configuration, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub aligner: AlignerConfig,
    /// Intervals to summarise, in report order.
    pub intervals: Vec<IntervalDefinition>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            aligner: AlignerConfig::default(),
            intervals: IntervalDefinition::standard(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        self.aligner.validate()?;
        if let Some(d) = self.intervals.iter().find(|d| d.from == d.to) {
            return Err(LatencyError::InvalidConfig(format!(
                "interval '{}' starts and ends on {}",
                d.label, d.from
            )));
        }
        Ok(())
    }
}

/// Result of analysing one capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub edges: EdgeSet,
    pub frames: Vec<Frame>,
    pub report: AlignmentReport,
    pub intervals: Vec<IntervalSummary>,
}

impl Analysis {
    pub fn complete_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.is_complete()).count()
    }

    /// Summary for an interval label.
    pub fn interval(&self, label: &str) -> Option<&IntervalSummary> {
        self.intervals.iter().find(|s| s.definition.label == label)
    }
}

/// Runs the pipeline with a fixed, validated configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    aligner: FrameAligner,
    intervals: Vec<IntervalDefinition>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            aligner: FrameAligner::default(),
            intervals: IntervalDefinition::standard(),
        }
    }
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            aligner: FrameAligner::new(config.aligner)?,
            intervals: config.intervals,
        })
    }

    pub fn aligner(&self) -> &FrameAligner {
        &self.aligner
    }

    pub fn intervals(&self) -> &[IntervalDefinition] {
        &self.intervals
    }

    /// Analyse a time-ordered sample table.
    pub fn analyze(&self, samples: &[Sample]) -> Analysis {
        self.analyze_edges(EdgeSet::detect(samples))
    }

    /// Analyse edge sequences extracted elsewhere.
    pub fn analyze_edges(&self, edges: EdgeSet) -> Analysis {
        let alignment = self.aligner.align(&edges);
        let intervals = interval_statistics(&alignment.frames, &self.intervals);
        Analysis {
            edges,
            frames: alignment.frames,
            report: alignment.report,
            intervals,
        }
    }
}
