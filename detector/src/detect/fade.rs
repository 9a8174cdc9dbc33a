use scenecut_common::{Frame, FrameIndex};
use std::iter::FusedIterator;
use tracing::{debug, info};

use super::traits::{CutDetector, CutFilter};
use super::{check_threshold, DetectError};
use crate::features;
use crate::source::{FrameSource, Rewind};

pub const DEFAULT_THRESHOLD: f64 = 100.0;

/// Brightness-level crossing filter, aimed at fades to and from black.
///
/// A cut is declared whenever consecutive frame means sit on opposite sides of
/// `threshold` (one `>= threshold`, the other below it).
pub struct FadeFilter {
    last_mean: Option<f64>,
    threshold: f64,
}

impl FadeFilter {
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
        let crossed = (prev >= self.threshold) != (mean >= self.threshold);
        if crossed {
            debug!(
                from = format!("{:.3}", prev),
                to = format!("{:.3}", mean),
                threshold = self.threshold,
                "threshold crossed"
            );
        }
        crossed
    }
}

impl CutFilter for FadeFilter {
    fn is_cut(&mut self, frame: &Frame) -> bool {
        self.push(features::mean(frame))
    }

    fn name(&self) -> &str {
        "fade"
    }
}

#[derive(Debug, Clone)]
pub struct FadeDetector {
    threshold: f64,
}

impl FadeDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Result<Self, DetectError> {
        Ok(Self {
            threshold: check_threshold("fade threshold", threshold)?,
        })
    }

    /// Lazily yield cuts as frames are pulled from `source`.
    ///
    /// The iterator makes a single pass and is not resumable once it returns
    /// `None`. The source is rewound when the pass ends or the iterator is
    /// dropped early.
    pub fn cuts<'a>(&self, source: &'a mut dyn FrameSource) -> FadeCuts<'a> {
        FadeCuts {
            pass: Some(Rewind::new(source)),
            filter: FadeFilter::new(self.threshold),
            found: 0,
        }
    }
}

impl Default for FadeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CutDetector for FadeDetector {
    fn name(&self) -> &str {
        "fade"
    }

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError> {
        self.cuts(source).collect()
    }
}

/// Pull-based producer of fade cuts. See [`FadeDetector::cuts`].
pub struct FadeCuts<'a> {
    pass: Option<Rewind<'a>>,
    filter: FadeFilter,
    found: usize,
}

impl Iterator for FadeCuts<'_> {
    type Item = Result<FrameIndex, DetectError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pass = self.pass.as_mut()?;
        loop {
            match pass.read_next() {
                Ok(Some(frame)) => {
                    if self.filter.is_cut(&frame) {
                        self.found += 1;
                        return Some(Ok(pass.position()));
                    }
                }
                Ok(None) => {
                    let frames = pass.position();
                    let pass = self.pass.take()?;
                    info!(
                        detector = "fade",
                        frames,
                        cuts = self.found,
                        "detection pass complete"
                    );
                    return pass.finish().err().map(|e| Err(e.into()));
                }
                Err(e) => {
                    // Dropping the guard rewinds the source.
                    self.pass = None;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

impl FusedIterator for FadeCuts<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::{source_with_means, FailingSource};

    #[test]
    fn two_crossings_give_two_cuts() {
        let mut src = source_with_means(&[50, 150, 50]);
        assert_eq!(FadeDetector::new().detect(&mut src).unwrap(), vec![2, 3]);
    }

    #[test]
    fn threshold_value_counts_as_above() {
        let mut filter = FadeFilter::new(100.0);
        assert!(!filter.push(99.0));
        assert!(filter.push(100.0));
        assert!(!filter.push(140.0));
        assert!(filter.push(99.9));
    }

    #[test]
    fn staying_on_one_side_never_cuts() {
        let mut src = source_with_means(&[0, 40, 90, 20, 99]);
        assert!(FadeDetector::new().detect(&mut src).unwrap().is_empty());
    }

    #[test]
    fn lazy_cuts_yield_one_at_a_time() {
        let mut src = source_with_means(&[10, 200, 210, 10, 10, 150]);
        let detector = FadeDetector::new();
        let mut cuts = detector.cuts(&mut src);
        assert_eq!(cuts.next().unwrap().unwrap(), 2);
        assert_eq!(cuts.next().unwrap().unwrap(), 4);
        assert_eq!(cuts.next().unwrap().unwrap(), 6);
        assert!(cuts.next().is_none());
        assert!(cuts.next().is_none(), "exhausted iterator stays exhausted");
        drop(cuts);
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn dropping_lazy_cuts_early_rewinds() {
        let mut src = source_with_means(&[10, 200, 10, 200]);
        let detector = FadeDetector::new();
        {
            let mut cuts = detector.cuts(&mut src);
            assert_eq!(cuts.next().unwrap().unwrap(), 2);
        }
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn eager_and_lazy_agree() {
        let means = [120, 80, 80, 101, 99, 100];
        let detector = FadeDetector::new();
        let eager = detector.detect(&mut source_with_means(&means)).unwrap();
        let mut src = source_with_means(&means);
        let lazy: Vec<_> = detector.cuts(&mut src).map(Result::unwrap).collect();
        assert_eq!(eager, lazy);
        assert_eq!(eager, vec![2, 4, 5, 6]);
    }

    #[test]
    fn source_error_surfaces_and_ends_iteration() {
        let mut src = FailingSource::new(&[10, 200]);
        let detector = FadeDetector::new();
        let mut cuts = detector.cuts(&mut src);
        assert_eq!(cuts.next().unwrap().unwrap(), 2);
        assert!(matches!(cuts.next(), Some(Err(DetectError::Source(_)))));
        assert!(cuts.next().is_none());
        drop(cuts);
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn eager_detect_fails_atomically() {
        let mut src = FailingSource::new(&[10, 200, 10]);
        assert!(FadeDetector::new().detect(&mut src).is_err());
        assert_eq!(src.position(), 0);
    }
}
