use scenecut_common::FrameIndex;
use tracing::info;

use super::fade::FadeDetector;
use super::mean::MeanDeltaDetector;
use super::traits::CutDetector;
use super::DetectError;
use crate::source::FrameSource;

/// Runs two detectors over the same source, one after the other, and merges
/// their cuts.
///
/// The merged list is sorted ascending. Frames flagged by both detectors
/// appear twice.
pub struct HybridDetector {
    first: Box<dyn CutDetector>,
    second: Box<dyn CutDetector>,
}

impl HybridDetector {
    pub fn new(first: Box<dyn CutDetector>, second: Box<dyn CutDetector>) -> Self {
        Self { first, second }
    }
}

impl Default for HybridDetector {
    /// Brightness jumps combined with fade crossings.
    fn default() -> Self {
        Self::new(
            Box::new(MeanDeltaDetector::new()),
            Box::new(FadeDetector::new()),
        )
    }
}

impl CutDetector for HybridDetector {
    fn name(&self) -> &str {
        "hybrid"
    }

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError> {
        let mut cuts = self.first.detect(source)?;
        let second = self.second.detect(source)?;
        info!(
            first = self.first.name(),
            first_cuts = cuts.len(),
            second = self.second.name(),
            second_cuts = second.len(),
            "merging cut lists"
        );
        cuts.extend(second);
        cuts.sort_unstable();
        Ok(cuts)
    }
}
