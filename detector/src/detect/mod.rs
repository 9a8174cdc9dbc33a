mod cached;
mod edge;
mod fade;
mod hybrid;
mod hysteresis;
mod mean;
mod quadrant;
mod select;
#[cfg(test)]
mod testing;
mod traits;

pub use cached::{similarity_runs, CachedIntervalDetector};
pub use edge::{EdgeDeltaDetector, EdgeDeltaFilter};
pub use fade::{FadeCuts, FadeDetector, FadeFilter};
pub use hybrid::HybridDetector;
pub use hysteresis::{HysteresisDetector, HysteresisFilter};
pub use mean::{MeanDeltaDetector, MeanDeltaFilter};
pub use quadrant::{QuadrantDeltaDetector, QuadrantDeltaFilter};
pub use select::{from_config, ConfiguredDetector};
pub use traits::{CutDetector, CutFilter};

use scenecut_common::FrameIndex;
use tracing::{debug, info};

use crate::source::{FrameSource, Rewind, SourceError};

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("frame source failed: {0}")]
    Source(#[from] SourceError),
    #[error("invalid {name} {value}: {reason}")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Accept a finite, non-negative threshold.
pub(crate) fn check_threshold(name: &'static str, value: f64) -> Result<f64, DetectError> {
    if !value.is_finite() {
        return Err(DetectError::InvalidThreshold {
            name,
            value,
            reason: "must be finite",
        });
    }
    if value < 0.0 {
        return Err(DetectError::InvalidThreshold {
            name,
            value,
            reason: "must not be negative",
        });
    }
    Ok(value)
}

/// Run `filter` over every frame of `source` in one pass and collect the
/// positions it flags.
///
/// The source is rewound afterwards on every path. A source error aborts the
/// pass and discards any cuts found so far.
pub fn scan(
    source: &mut dyn FrameSource,
    filter: &mut dyn CutFilter,
) -> Result<Vec<FrameIndex>, DetectError> {
    let mut pass = Rewind::new(source);
    let mut cuts = Vec::new();

    while let Some(frame) = pass.read_next()? {
        if filter.is_cut(&frame) {
            let index = pass.position();
            debug!(frame = index, detector = filter.name(), "cut");
            cuts.push(index);
        }
    }

    let frames = pass.position();
    pass.finish()?;

    info!(
        detector = filter.name(),
        frames,
        cuts = cuts.len(),
        "detection pass complete"
    );
    Ok(cuts)
}
