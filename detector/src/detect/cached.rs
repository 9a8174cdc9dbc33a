use scenecut_common::FrameIndex;
use tracing::{debug, info};

use super::{check_threshold, DetectError};
use crate::cache::SimilarityRecord;

pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Maximal runs of consecutive positions whose value exceeds `threshold`,
/// as inclusive `(first, last)` position pairs.
pub fn similarity_runs(values: impl IntoIterator<Item = f64>, threshold: f64) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    let mut len = 0;

    for (i, value) in values.into_iter().enumerate() {
        len = i + 1;
        match (value > threshold, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, len - 1));
    }
    runs
}

/// Cut detector over precomputed pair similarities.
///
/// Never touches frames. Each maximal run of records whose larger score
/// exceeds `threshold` is one transition, reported once at the record in the
/// middle of the run (`floor((first + last) / 2)` by position). The emitted
/// value is that record's own `index`.
#[derive(Debug, Clone)]
pub struct CachedIntervalDetector {
    threshold: f64,
}

impl CachedIntervalDetector {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Result<Self, DetectError> {
        Ok(Self {
            threshold: check_threshold("similarity threshold", threshold)?,
        })
    }

    pub fn name(&self) -> &str {
        "edge_detection_cached"
    }

    pub fn detect(&self, records: &[SimilarityRecord]) -> Vec<FrameIndex> {
        let runs = similarity_runs(records.iter().map(SimilarityRecord::rho_max), self.threshold);
        let cuts: Vec<FrameIndex> = runs
            .iter()
            .map(|&(first, last)| {
                let mid = (first + last) / 2;
                debug!(first, last, mid, "similarity run");
                records[mid].index
            })
            .collect();

        info!(
            detector = self.name(),
            records = records.len(),
            cuts = cuts.len(),
            "detection pass complete"
        );
        cuts
    }
}

impl Default for CachedIntervalDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rho: &[f64]) -> Vec<SimilarityRecord> {
        rho.iter()
            .enumerate()
            .map(|(i, &r)| SimilarityRecord::new(i as FrameIndex, r, 0.0))
            .collect()
    }

    #[test]
    fn runs_collapse_to_midpoints() {
        let recs = records(&[0.1, 0.9, 0.85, 0.2, 0.9]);
        assert_eq!(CachedIntervalDetector::new().detect(&recs), vec![1, 4]);
    }

    #[test]
    fn run_detection() {
        assert_eq!(
            similarity_runs([0.1, 0.9, 0.85, 0.2, 0.9], 0.8),
            vec![(1, 2), (4, 4)]
        );
        assert_eq!(similarity_runs([0.9, 0.9, 0.9], 0.8), vec![(0, 2)]);
        assert!(similarity_runs([0.8, 0.1], 0.8).is_empty());
        assert!(similarity_runs(Vec::<f64>::new(), 0.8).is_empty());
    }

    #[test]
    fn long_run_reports_its_middle() {
        let recs = records(&[0.0, 0.95, 0.95, 0.95, 0.95, 0.95, 0.0]);
        // Run covers positions 1..=5.
        assert_eq!(CachedIntervalDetector::new().detect(&recs), vec![3]);
    }

    #[test]
    fn larger_of_the_two_scores_counts() {
        let recs = vec![
            SimilarityRecord::new(10, 0.1, 0.2),
            SimilarityRecord::new(11, 0.1, 0.9),
            SimilarityRecord::new(12, 0.85, 0.0),
            SimilarityRecord::new(13, 0.3, 0.3),
        ];
        assert_eq!(CachedIntervalDetector::new().detect(&recs), vec![11]);
    }

    #[test]
    fn reports_record_indices_not_positions() {
        let recs = vec![
            SimilarityRecord::new(100, 0.0, 0.0),
            SimilarityRecord::new(101, 0.99, 0.0),
        ];
        assert_eq!(CachedIntervalDetector::new().detect(&recs), vec![101]);
    }

    #[test]
    fn threshold_validation() {
        assert!(CachedIntervalDetector::with_threshold(0.5).is_ok());
        assert!(CachedIntervalDetector::with_threshold(f64::NAN).is_err());
    }
}
