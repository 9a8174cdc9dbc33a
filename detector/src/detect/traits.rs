use scenecut_common::{Frame, FrameIndex};

use super::DetectError;
use crate::source::FrameSource;

/// Per-frame cut decision with the minimal history it needs.
///
/// Implementations see every frame once, in order, and answer whether the
/// frame starts a new shot relative to what they have seen so far.
pub trait CutFilter {
    /// Returns `true` if a cut is declared at this frame.
    fn is_cut(&mut self, frame: &Frame) -> bool;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// A cut-detection algorithm run over a whole frame source.
///
/// `detect` makes exactly one pass and leaves the source rewound to its start,
/// whether it succeeds or fails. On failure no partial cut list is returned.
pub trait CutDetector: Send + Sync {
    fn name(&self) -> &str;

    fn detect(&self, source: &mut dyn FrameSource) -> Result<Vec<FrameIndex>, DetectError>;
}
