use scenecut_common::{Frame, FrameIndex};
use tracing::{debug, warn};

use super::traits::{CutDetector, CutFilter};
use super::{check_threshold, scan, DetectError};
use crate::features::{edge_map, expand, overlap_score, EdgeMap, Expansion};
use crate::source::FrameSource;

/// Change in overlap score, in percentage points.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Structural-change filter built on edge maps.
///
/// Keeps the expanded edge map of the previous frame and the previous overlap
/// score. A cut is declared when the overlap score moves by more than
/// `threshold` between consecutive frames. Frame 2 is compared against a
/// baseline score of 0, so a cut on frame 2 is reported on frame 2.
///
/// Because the score is compared with its predecessor, a single hard cut
/// usually fires on the cut frame and again on the frame after it, when the
/// score drops back.
pub struct EdgeDeltaFilter {
    prev_expanded: Option<EdgeMap>,
    prev_score: f64,
    threshold: f64,
    expansion: Expansion,
}

impl EdgeDeltaFilter {
    pub fn new(threshold: f64, expansion: Expansion) -> Self {
        Self {
            prev_expanded: None,
            prev_score: 0.0,
            threshold,
            expansion,
        }
    }

    /// Feed the next frame's edge map. Returns `true` on a cut.
    pub fn push(&mut self, edges: EdgeMap) -> bool {
        let expanded = expand(&edges, self.expansion);
        let Some(prev) = self.prev_expanded.replace(expanded) else {
            return false;
        };

        let Some(score) = overlap_score(&edges, &prev) else {
            warn!(
                width = edges.width(),
                height = edges.height(),
                "frame size changed; restarting edge comparison"
            );
            self.prev_score = 0.0;
            return false;
        };

        let prev_score = std::mem::replace(&mut self.prev_score, score);
        let change = (score - prev_score).abs();
        let is_cut = change > self.threshold;
        debug!(
            score = format!("{:.3}", score),
            change = format!("{:.3}", change),
            is_cut,
            "edge overlap"
        );
        is_cut
    }
}

impl CutFilter for EdgeDeltaFilter {
    fn is_cut(&mut self, frame: &Frame) -> bool {
        self.push(edge_map(frame))
    }

    fn name(&self) -> &str {
        "edge_detection"
    }
}

#[derive(Debug, Clone)]
pub struct EdgeDeltaDetector {
    threshold: f64,
    expansion: Expansion,
}

impl EdgeDeltaDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            expansion: Expansion::default(),
        }
    }

    pub fn with_threshold(threshold: f64) -> Result<Self, DetectError> {
        Ok(Self {
            threshold: check_threshold("edge threshold", threshold)?,
            ..Self::new()
        })
    }

    pub fn expansion(mut self, expansion: Expansion) -> Result<Self, DetectError> {
        if let Expansion::Blur { sigma } = expansion {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(DetectError::InvalidThreshold {
                    name: "blur sigma",
                    value: sigma as f64,
                    reason: "must be positive",
                });
            }
        }
        self.expansion = expansion;
        Ok(self)
    }
}

impl Default for EdgeDeltaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CutDetector for EdgeDeltaDetector {
    fn name(&self) -> &str {
        "edge_detection"
    }

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError> {
        scan(source, &mut EdgeDeltaFilter::new(self.threshold, self.expansion))
    }
}
