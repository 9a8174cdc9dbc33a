use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Directory holding one still image per frame, in file-name order.
    #[serde(default)]
    pub frames_dir: Option<PathBuf>,
    /// JSON file of `[index, value_a, value_b]` records for the cached detector.
    #[serde(default)]
    pub similarity_file: Option<PathBuf>,
}

/// Which cut-detection heuristic to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Naive,
    NaiveDoubleCap,
    Fade,
    Hybrid,
    Multimean,
    EdgeDetection,
    EdgeDetectionCached,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Naive => "naive",
            Algorithm::NaiveDoubleCap => "naive_double_cap",
            Algorithm::Fade => "fade",
            Algorithm::Hybrid => "hybrid",
            Algorithm::Multimean => "multimean",
            Algorithm::EdgeDetection => "edge_detection",
            Algorithm::EdgeDetectionCached => "edge_detection_cached",
        }
    }

    /// The cached detector works from the similarity file, never from frames.
    pub fn reads_frames(&self) -> bool {
        !matches!(self, Algorithm::EdgeDetectionCached)
    }
}

/// How an edge map is widened before comparing it with the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionKind {
    /// 3x3 morphological dilation.
    #[default]
    Dilate,
    /// Gaussian blur, re-binarised.
    Blur,
}

/// Options for the selected detector.
///
/// Threshold fields left unset fall back to the detector's own default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: Algorithm,
    /// Primary threshold for every algorithm except `naive_double_cap`.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// `naive_double_cap` only: single-step jump that always cuts.
    #[serde(default)]
    pub hard_threshold: Option<f64>,
    /// `naive_double_cap` only: smallest step that anchors a drift baseline.
    #[serde(default)]
    pub soft_threshold: Option<f64>,
    /// `hybrid` only: brightness level for the threshold-crossing half.
    #[serde(default)]
    pub fade_threshold: Option<f64>,
    /// `edge_detection` only. Dilation when unset.
    #[serde(default)]
    pub expansion: Option<ExpansionKind>,
    /// `edge_detection` with `expansion = "blur"` only.
    #[serde(default)]
    pub blur_sigma: Option<f32>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            threshold: None,
            hard_threshold: None,
            soft_threshold: None,
            fade_threshold: None,
            expansion: None,
            blur_sigma: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            algorithm = config.detector.algorithm.as_str(),
            "config loaded"
        );
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject options that do not apply to the selected algorithm, bad
    /// threshold values, and a missing input for the selected algorithm.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.detector;

        for (name, value) in [
            ("threshold", d.threshold),
            ("hard_threshold", d.hard_threshold),
            ("soft_threshold", d.soft_threshold),
            ("fade_threshold", d.fade_threshold),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be a finite non-negative number, got {v}"
                    )));
                }
            }
        }

        let double_cap = d.algorithm == Algorithm::NaiveDoubleCap;
        if double_cap && d.threshold.is_some() {
            return Err(ConfigError::Invalid(
                "naive_double_cap takes hard_threshold/soft_threshold, not threshold".into(),
            ));
        }
        if !double_cap && (d.hard_threshold.is_some() || d.soft_threshold.is_some()) {
            return Err(ConfigError::Invalid(format!(
                "hard_threshold/soft_threshold do not apply to {}",
                d.algorithm.as_str()
            )));
        }
        if d.fade_threshold.is_some() && d.algorithm != Algorithm::Hybrid {
            return Err(ConfigError::Invalid(format!(
                "fade_threshold does not apply to {}",
                d.algorithm.as_str()
            )));
        }
        if d.algorithm != Algorithm::EdgeDetection
            && (d.expansion.is_some() || d.blur_sigma.is_some())
        {
            return Err(ConfigError::Invalid(format!(
                "expansion/blur_sigma do not apply to {}",
                d.algorithm.as_str()
            )));
        }
        if let Some(sigma) = d.blur_sigma {
            if d.expansion != Some(ExpansionKind::Blur) {
                return Err(ConfigError::Invalid(
                    "blur_sigma needs expansion = \"blur\"".into(),
                ));
            }
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "blur_sigma must be positive, got {sigma}"
                )));
            }
        }

        if d.algorithm.reads_frames() {
            self.frames_dir()?;
        } else {
            self.similarity_file()?;
        }

        Ok(())
    }

    /// Frames directory for the frame-reading algorithms.
    pub fn frames_dir(&self) -> Result<&Path, ConfigError> {
        self.source.frames_dir.as_deref().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{} needs source.frames_dir",
                self.detector.algorithm.as_str()
            ))
        })
    }

    /// Similarity file for `edge_detection_cached`.
    pub fn similarity_file(&self) -> Result<&Path, ConfigError> {
        self.source.similarity_file.as_deref().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "{} needs source.similarity_file",
                self.detector.algorithm.as_str()
            ))
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_algorithm() -> Algorithm {
    Algorithm::Naive
}
fn default_log_level() -> String {
    "info".into()
}
