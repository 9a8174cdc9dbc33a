use scenecut_common::{Frame, FrameIndex};
use tracing::debug;

use super::traits::{CutDetector, CutFilter};
use super::{check_threshold, scan, DetectError};
use crate::features;
use crate::source::FrameSource;

pub const DEFAULT_HARD_THRESHOLD: f64 = 22.0;
pub const DEFAULT_SOFT_THRESHOLD: f64 = 2.0;

/// Two-threshold brightness filter.
///
/// A single step above `hard` cuts immediately. A step between `soft` and
/// `hard` anchors a drift baseline at the current mean; while steps stay in
/// that band, a cut fires once the mean has wandered more than `hard` from the
/// baseline. A step at or below `soft` ends the drift.
pub struct HysteresisFilter {
    last_mean: Option<f64>,
    baseline: Option<f64>,
    hard: f64,
    soft: f64,
}

impl HysteresisFilter {
    pub fn new(hard: f64, soft: f64) -> Self {
        Self {
            last_mean: None,
            baseline: None,
            hard,
            soft,
        }
    }

    /// Feed the next frame's mean. Returns `true` on a cut.
    pub fn push(&mut self, mean: f64) -> bool {
        let Some(prev) = self.last_mean.replace(mean) else {
            return false;
        };
        let delta = (mean - prev).abs();

        if delta > self.hard {
            debug!(delta = format!("{:.3}", delta), "hard jump");
            self.baseline = None;
            return true;
        }

        if delta <= self.soft {
            self.baseline = None;
            return false;
        }

        match self.baseline {
            None => {
                self.baseline = Some(mean);
                false
            }
            Some(anchor) => {
                let drift = (mean - anchor).abs();
                let is_cut = drift > self.hard;
                debug!(
                    drift = format!("{:.3}", drift),
                    anchor = format!("{:.3}", anchor),
                    is_cut,
                    "drift check"
                );
                if is_cut {
                    self.baseline = None;
                }
                is_cut
            }
        }
    }
}

impl CutFilter for HysteresisFilter {
    fn is_cut(&mut self, frame: &Frame) -> bool {
        self.push(features::mean(frame))
    }

    fn name(&self) -> &str {
        "naive_double_cap"
    }
}

#[derive(Debug, Clone)]
pub struct HysteresisDetector {
    hard: f64,
    soft: f64,
}

impl HysteresisDetector {
    pub fn new() -> Self {
        Self {
            hard: DEFAULT_HARD_THRESHOLD,
            soft: DEFAULT_SOFT_THRESHOLD,
        }
    }

    /// `soft` must be strictly below `hard`.
    pub fn with_thresholds(hard: f64, soft: f64) -> Result<Self, DetectError> {
        let hard = check_threshold("hard threshold", hard)?;
        let soft = check_threshold("soft threshold", soft)?;
        if soft >= hard {
            return Err(DetectError::InvalidThreshold {
                name: "soft threshold",
                value: soft,
                reason: "must be below the hard threshold",
            });
        }
        Ok(Self { hard, soft })
    }
}

impl Default for HysteresisDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CutDetector for HysteresisDetector {
    fn name(&self) -> &str {
        "naive_double_cap"
    }

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError> {
        scan(source, &mut HysteresisFilter::new(self.hard, self.soft))
    }
}
