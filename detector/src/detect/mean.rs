use scenecut_common::{Frame, FrameIndex};
use tracing::debug;

use super::traits::{CutDetector, CutFilter};
use super::{check_threshold, scan, DetectError};
use crate::features;
use crate::source::FrameSource;

pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Global-brightness delta filter.
///
/// Each frame is compared with its immediate predecessor only; a jump in mean
/// intensity larger than `threshold` is a cut.
pub struct MeanDeltaFilter {
    last_mean: Option<f64>,
    threshold: f64,
}

impl MeanDeltaFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            last_mean: None,
            threshold,
        }
    }

    /// Feed the next frame's mean. Returns `true` on a cut.
    pub fn push(&mut self, mean: f64) -> bool {
        let Some(prev) = self.last_mean.replace(mean) else {
            return false;
        };
        let delta = (mean - prev).abs();
        let is_cut = delta > self.threshold;
        debug!(
            delta = format!("{:.3}", delta),
            threshold = self.threshold,
            is_cut,
            "mean delta"
        );
        is_cut
    }
}

impl CutFilter for MeanDeltaFilter {
    fn is_cut(&mut self, frame: &Frame) -> bool {
        self.push(features::mean(frame))
    }

    fn name(&self) -> &str {
        "naive"
    }
}

#[derive(Debug, Clone)]
pub struct MeanDeltaDetector {
    threshold: f64,
}

impl MeanDeltaDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Result<Self, DetectError> {
        Ok(Self {
            threshold: check_threshold("mean delta threshold", threshold)?,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for MeanDeltaDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CutDetector for MeanDeltaDetector {
    fn name(&self) -> &str {
        "naive"
    }

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError> {
        scan(source, &mut MeanDeltaFilter::new(self.threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::{source_with_means, FailingSource};

    #[test]
    fn jump_over_threshold_cuts() {
        let mut src = source_with_means(&[0, 25]);
        assert_eq!(MeanDeltaDetector::new().detect(&mut src).unwrap(), vec![2]);
    }

    #[test]
    fn jump_under_threshold_does_not_cut() {
        let mut src = source_with_means(&[0, 10]);
        assert!(MeanDeltaDetector::new().detect(&mut src).unwrap().is_empty());
    }

    #[test]
    fn delta_equal_to_threshold_does_not_cut() {
        let mut filter = MeanDeltaFilter::new(20.0);
        assert!(!filter.push(0.0));
        assert!(!filter.push(20.0));
        assert!(filter.push(40.5));
    }

    #[test]
    fn compares_only_with_predecessor() {
        // Slow ramp: every step is 5, total drift 40, never a cut.
        let mut src = source_with_means(&[0, 5, 10, 15, 20, 25, 30, 35, 40]);
        assert!(MeanDeltaDetector::new().detect(&mut src).unwrap().is_empty());
    }

    #[test]
    fn custom_threshold() {
        let mut src = source_with_means(&[100, 106, 104, 120]);
        let detector = MeanDeltaDetector::with_threshold(5.0).unwrap();
        assert_eq!(detector.detect(&mut src).unwrap(), vec![2, 4]);
    }

    #[test]
    fn invalid_threshold_rejected() {
        assert!(MeanDeltaDetector::with_threshold(f64::NAN).is_err());
        assert!(MeanDeltaDetector::with_threshold(-3.0).is_err());
        assert!(MeanDeltaDetector::with_threshold(f64::INFINITY).is_err());
    }

    #[test]
    fn source_is_rewound_and_pass_repeatable() {
        let mut src = source_with_means(&[0, 50, 50, 0]);
        let detector = MeanDeltaDetector::new();
        let first = detector.detect(&mut src).unwrap();
        assert_eq!(src.position(), 0);
        let second = detector.detect(&mut src).unwrap();
        assert_eq!(first, vec![2, 4]);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_and_single_frame_sources() {
        let detector = MeanDeltaDetector::new();
        assert!(detector.detect(&mut source_with_means(&[])).unwrap().is_empty());
        assert!(detector.detect(&mut source_with_means(&[200])).unwrap().is_empty());
    }

    #[test]
    fn source_failure_aborts_and_rewinds() {
        let mut src = FailingSource::new(&[0, 100, 0]);
        let result = MeanDeltaDetector::new().detect(&mut src);
        assert!(matches!(result, Err(DetectError::Source(_))));
        assert_eq!(src.position(), 0);
    }
}
