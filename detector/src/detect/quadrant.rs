use scenecut_common::{Frame, FrameIndex};
use tracing::debug;

use super::traits::{CutDetector, CutFilter};
use super::{check_threshold, scan, DetectError};
use crate::features::{self, QuadrantMeans};
use crate::source::FrameSource;

pub const DEFAULT_THRESHOLD: f64 = 30.0;

/// Quadrant-mean delta filter.
///
/// Compares the four quadrant means of consecutive frames by Manhattan
/// distance, so motion confined to one region moves less than a real cut that
/// shifts several regions at once.
pub struct QuadrantDeltaFilter {
    last: Option<QuadrantMeans>,
    threshold: f64,
}

impl QuadrantDeltaFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            last: None,
            threshold,
        }
    }

    /// Feed the next frame's quadrant means. Returns `true` on a cut.
    pub fn push(&mut self, means: QuadrantMeans) -> bool {
        let Some(prev) = self.last.replace(means) else {
            return false;
        };
        let distance = prev.manhattan_distance(&means);
        let is_cut = distance > self.threshold;
        debug!(
            distance = format!("{:.3}", distance),
            threshold = self.threshold,
            is_cut,
            "quadrant delta"
        );
        is_cut
    }
}

impl CutFilter for QuadrantDeltaFilter {
    fn is_cut(&mut self, frame: &Frame) -> bool {
        self.push(features::quadrant_means(frame))
    }

    fn name(&self) -> &str {
        "multimean"
    }
}

#[derive(Debug, Clone)]
pub struct QuadrantDeltaDetector {
    threshold: f64,
}

impl QuadrantDeltaDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// `None` keeps the default threshold.
    pub fn with_threshold(threshold: Option<f64>) -> Result<Self, DetectError> {
        match threshold {
            None => Ok(Self::new()),
            Some(t) => Ok(Self {
                threshold: check_threshold("quadrant threshold", t)?,
            }),
        }
    }
}

impl Default for QuadrantDeltaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CutDetector for QuadrantDeltaDetector {
    fn name(&self) -> &str {
        "multimean"
    }

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError> {
        scan(source, &mut QuadrantDeltaFilter::new(self.threshold))
    }
}
