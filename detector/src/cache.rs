use scenecut_common::FrameIndex;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Precomputed similarity scores for one adjacent frame pair.
///
/// On disk each record is a 3-element JSON array `[index, value_a, value_b]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(FrameIndex, f64, f64)")]
pub struct SimilarityRecord {
    pub index: FrameIndex,
    pub value_a: f64,
    pub value_b: f64,
}

impl SimilarityRecord {
    pub fn new(index: FrameIndex, value_a: f64, value_b: f64) -> Self {
        Self {
            index,
            value_a,
            value_b,
        }
    }

    /// The larger of the two scores.
    pub fn rho_max(&self) -> f64 {
        self.value_a.max(self.value_b)
    }
}

impl From<(FrameIndex, f64, f64)> for SimilarityRecord {
    fn from((index, value_a, value_b): (FrameIndex, f64, f64)) -> Self {
        Self::new(index, value_a, value_b)
    }
}

/// Read a similarity file in full.
pub fn load_similarity_records(path: &Path) -> Result<Vec<SimilarityRecord>, CacheError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CacheError::Read(path.display().to_string(), e))?;
    let records = parse_similarity_records(&content)?;
    info!(path = %path.display(), records = records.len(), "similarity records loaded");
    Ok(records)
}

pub fn parse_similarity_records(content: &str) -> Result<Vec<SimilarityRecord>, CacheError> {
    serde_json::from_str(content).map_err(|e| CacheError::Parse(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to read similarity file {0}: {1}")]
    Read(String, std::io::Error),
    #[error("failed to parse similarity records: {0}")]
    Parse(String),
}
