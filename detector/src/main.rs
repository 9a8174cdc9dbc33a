use scenecut_common::config::{Config, ConfigError};
use scenecut_common::FrameIndex;
use scenecut_detector::cache::{load_similarity_records, CacheError};
use scenecut_detector::detect::{from_config, ConfiguredDetector, DetectError};
use scenecut_detector::source::{ImageSequenceSource, SourceError};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        algorithm = config.detector.algorithm.as_str(),
        threshold = ?config.detector.threshold,
        "starting scene cut detection"
    );

    let report = match run(&config) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "detection failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!(error = %e, "failed to serialize report");
            std::process::exit(1);
        }
    }
}

#[derive(Debug, Serialize)]
struct CutReport {
    algorithm: String,
    #[serde(flatten)]
    input: ReportInput,
    cuts: Vec<FrameIndex>,
    generated_at: String,
}

/// Serialised under the config key it came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum ReportInput {
    FramesDir(String),
    SimilarityFile(String),
}

fn run(config: &Config) -> Result<CutReport, RunError> {
    let detector = from_config(&config.detector)?;

    let (input, cuts) = match &detector {
        ConfiguredDetector::Frames(d) => {
            let dir = config.frames_dir()?;
            let mut source = ImageSequenceSource::open(dir)?;
            let cuts = d.detect(&mut source)?;
            (ReportInput::FramesDir(dir.display().to_string()), cuts)
        }
        ConfiguredDetector::Cached(d) => {
            let path = config.similarity_file()?;
            let records = load_similarity_records(path)?;
            let cuts = d.detect(&records);
            (ReportInput::SimilarityFile(path.display().to_string()), cuts)
        }
    };

    info!(detector = detector.name(), cuts = cuts.len(), "detection finished");

    Ok(CutReport {
        algorithm: detector.name().to_string(),
        input,
        cuts,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}
