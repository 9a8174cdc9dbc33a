use scenecut_common::config::{Algorithm, DetectorConfig, ExpansionKind};

use super::cached::CachedIntervalDetector;
use super::edge::EdgeDeltaDetector;
use super::fade::FadeDetector;
use super::hybrid::HybridDetector;
use super::hysteresis::{HysteresisDetector, DEFAULT_HARD_THRESHOLD, DEFAULT_SOFT_THRESHOLD};
use super::mean::MeanDeltaDetector;
use super::quadrant::QuadrantDeltaDetector;
use super::traits::CutDetector;
use super::DetectError;
use crate::features::{Expansion, DEFAULT_BLUR_SIGMA};

/// A detector built from configuration. The cached variant consumes
/// similarity records instead of frames, so it cannot sit behind
/// [`CutDetector`].
pub enum ConfiguredDetector {
    Frames(Box<dyn CutDetector>),
    Cached(CachedIntervalDetector),
}

impl ConfiguredDetector {
    pub fn name(&self) -> &str {
        match self {
            ConfiguredDetector::Frames(d) => d.name(),
            ConfiguredDetector::Cached(d) => d.name(),
        }
    }
}

/// Build the configured detector, validating every threshold before any
/// input is touched.
pub fn from_config(config: &DetectorConfig) -> Result<ConfiguredDetector, DetectError> {
    let t = config.threshold;
    let detector: Box<dyn CutDetector> = match config.algorithm {
        Algorithm::Naive => Box::new(mean_delta(t)?),
        Algorithm::NaiveDoubleCap => Box::new(HysteresisDetector::with_thresholds(
            config.hard_threshold.unwrap_or(DEFAULT_HARD_THRESHOLD),
            config.soft_threshold.unwrap_or(DEFAULT_SOFT_THRESHOLD),
        )?),
        Algorithm::Fade => Box::new(fade(t)?),
        Algorithm::Hybrid => Box::new(HybridDetector::new(
            Box::new(mean_delta(t)?),
            Box::new(fade(config.fade_threshold)?),
        )),
        Algorithm::Multimean => Box::new(QuadrantDeltaDetector::with_threshold(t)?),
        Algorithm::EdgeDetection => {
            let expansion = match config.expansion.unwrap_or_default() {
                ExpansionKind::Dilate => Expansion::Dilate,
                ExpansionKind::Blur => Expansion::Blur {
                    sigma: config.blur_sigma.unwrap_or(DEFAULT_BLUR_SIGMA),
                },
            };
            let base = match t {
                Some(t) => EdgeDeltaDetector::with_threshold(t)?,
                None => EdgeDeltaDetector::new(),
            };
            Box::new(base.expansion(expansion)?)
        }
        Algorithm::EdgeDetectionCached => {
            let cached = match t {
                Some(t) => CachedIntervalDetector::with_threshold(t)?,
                None => CachedIntervalDetector::new(),
            };
            return Ok(ConfiguredDetector::Cached(cached));
        }
    };
    Ok(ConfiguredDetector::Frames(detector))
}

fn mean_delta(threshold: Option<f64>) -> Result<MeanDeltaDetector, DetectError> {
    match threshold {
        Some(t) => MeanDeltaDetector::with_threshold(t),
        None => Ok(MeanDeltaDetector::new()),
    }
}

fn fade(threshold: Option<f64>) -> Result<FadeDetector, DetectError> {
    match threshold {
        Some(t) => FadeDetector::with_threshold(t),
        None => Ok(FadeDetector::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testing::source_with_means;

    fn config(algorithm: Algorithm) -> DetectorConfig {
        DetectorConfig {
            algorithm,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn every_algorithm_builds_with_defaults() {
        for algorithm in [
            Algorithm::Naive,
            Algorithm::NaiveDoubleCap,
            Algorithm::Fade,
            Algorithm::Hybrid,
            Algorithm::Multimean,
            Algorithm::EdgeDetection,
            Algorithm::EdgeDetectionCached,
        ] {
            let built = from_config(&config(algorithm)).unwrap();
            assert_eq!(built.name(), algorithm.as_str());
        }
    }

    #[test]
    fn cached_is_not_a_frame_detector() {
        assert!(matches!(
            from_config(&config(Algorithm::EdgeDetectionCached)).unwrap(),
            ConfiguredDetector::Cached(_)
        ));
    }

    #[test]
    fn configured_threshold_is_applied() {
        let cfg = DetectorConfig {
            threshold: Some(5.0),
            ..config(Algorithm::Naive)
        };
        let ConfiguredDetector::Frames(detector) = from_config(&cfg).unwrap() else {
            panic!("naive should read frames");
        };
        let mut src = source_with_means(&[100, 107]);
        assert_eq!(detector.detect(&mut src).unwrap(), vec![2]);
    }

    #[test]
    fn hybrid_uses_fade_threshold() {
        let cfg = DetectorConfig {
            fade_threshold: Some(50.0),
            ..config(Algorithm::Hybrid)
        };
        let ConfiguredDetector::Frames(detector) = from_config(&cfg).unwrap() else {
            panic!("hybrid should read frames");
        };
        let mut src = source_with_means(&[40, 60]);
        assert_eq!(detector.detect(&mut src).unwrap(), vec![2]);
    }

    #[test]
    fn blur_expansion_without_sigma_uses_default() {
        let cfg = DetectorConfig {
            expansion: Some(ExpansionKind::Blur),
            ..config(Algorithm::EdgeDetection)
        };
        assert!(from_config(&cfg).is_ok());

        let cfg = DetectorConfig {
            expansion: Some(ExpansionKind::Blur),
            blur_sigma: Some(-1.0),
            ..config(Algorithm::EdgeDetection)
        };
        assert!(matches!(
            from_config(&cfg),
            Err(DetectError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn invalid_values_fail_before_any_input() {
        let cfg = DetectorConfig {
            threshold: Some(f64::NAN),
            ..config(Algorithm::Multimean)
        };
        assert!(matches!(
            from_config(&cfg),
            Err(DetectError::InvalidThreshold { .. })
        ));

        let cfg = DetectorConfig {
            hard_threshold: Some(1.0),
            soft_threshold: Some(3.0),
            ..config(Algorithm::NaiveDoubleCap)
        };
        assert!(from_config(&cfg).is_err());
    }
}
