//! Per-frame features the detectors compare across time.
//!
//! Everything here is a pure function of one frame.

pub mod edge;

pub use edge::{edge_map, expand, overlap_score, EdgeMap, Expansion, DEFAULT_BLUR_SIGMA};

use scenecut_common::Frame;

/// Average intensity over every sample of every channel. 0 for an empty frame.
pub fn mean(frame: &Frame) -> f64 {
    let samples = frame.samples();
    if samples.is_empty() {
        return 0.0;
    }
    let sum: u64 = samples.iter().map(|&s| s as u64).sum();
    sum as f64 / samples.len() as f64
}

/// Means of the four frame quadrants, in the order top-left, top-right,
/// bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantMeans(pub [f64; 4]);

impl QuadrantMeans {
    /// Sum of absolute component-wise differences.
    pub fn manhattan_distance(&self, other: &QuadrantMeans) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .sum()
    }
}

/// Split the frame at `height / 2` rows and `width / 2` columns and average
/// each region independently.
///
/// Rows are split first, then columns. With odd dimensions the extra row goes
/// to the bottom half and the extra column to the right half. A region with no
/// pixels has mean 0.
pub fn quadrant_means(frame: &Frame) -> QuadrantMeans {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let channels = frame.channels();
    let samples = frame.samples();

    let half_h = height / 2;
    let half_w = width / 2;
    let row_len = width * channels;
    let split = half_w * channels;

    let mut sums = [0u64; 4];
    for (y, row) in samples.chunks_exact(row_len.max(1)).take(height).enumerate() {
        let base = if y < half_h { 0 } else { 2 };
        sums[base] += row[..split].iter().map(|&s| s as u64).sum::<u64>();
        sums[base + 1] += row[split..].iter().map(|&s| s as u64).sum::<u64>();
    }

    let rows = [half_h, half_h, height - half_h, height - half_h];
    let cols = [half_w, width - half_w, half_w, width - half_w];

    let mut means = [0.0f64; 4];
    for q in 0..4 {
        let count = rows[q] * cols[q] * channels;
        if count > 0 {
            means[q] = sums[q] as f64 / count as f64;
        }
    }
    QuadrantMeans(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn mean_of_uniform_gray() {
        let frame = Frame::gray(GrayImage::from_pixel(8, 6, Luma([42])));
        assert_eq!(mean(&frame), 42.0);
    }

    #[test]
    fn mean_spans_all_channels() {
        let frame = Frame::rgb(RgbImage::from_pixel(3, 3, Rgb([0, 30, 90])));
        assert!((mean(&frame) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn mean_of_empty_frame_is_zero() {
        let frame = Frame::gray(GrayImage::new(0, 0));
        assert_eq!(mean(&frame), 0.0);
    }

    #[test]
    fn quadrants_follow_row_then_column_order() {
        // 4 rows x 6 columns: TL=10, TR=20, BL=30, BR=40.
        let img = GrayImage::from_fn(6, 4, |x, y| {
            let v = match (y < 2, x < 3) {
                (true, true) => 10,
                (true, false) => 20,
                (false, true) => 30,
                (false, false) => 40,
            };
            Luma([v])
        });
        let q = quadrant_means(&Frame::gray(img));
        assert_eq!(q, QuadrantMeans([10.0, 20.0, 30.0, 40.0]));
    }

    #[test]
    fn odd_dimensions_put_remainder_bottom_right() {
        // 3x3: only pixel (2,2) is bright, and it lands in bottom-right.
        // Bottom-right covers rows 1..3 and columns 1..3 (4 pixels).
        let img = GrayImage::from_fn(3, 3, |x, y| Luma([if x == 2 && y == 2 { 200 } else { 0 }]));
        let q = quadrant_means(&Frame::gray(img));
        assert_eq!(q.0[0], 0.0);
        assert_eq!(q.0[1], 0.0);
        assert_eq!(q.0[2], 0.0);
        assert_eq!(q.0[3], 50.0);
    }

    #[test]
    fn single_column_frame_has_empty_left_quadrants() {
        let img = GrayImage::from_pixel(1, 2, Luma([80]));
        let q = quadrant_means(&Frame::gray(img));
        assert_eq!(q, QuadrantMeans([0.0, 80.0, 0.0, 80.0]));
    }

    #[test]
    fn quadrants_of_rgb_frame() {
        let img = RgbImage::from_fn(2, 2, |x, _| if x == 0 { Rgb([0, 0, 0]) } else { Rgb([30, 60, 90]) });
        let q = quadrant_means(&Frame::rgb(img));
        assert_eq!(q, QuadrantMeans([0.0, 60.0, 0.0, 60.0]));
    }

    #[test]
    fn manhattan_distance_sums_components() {
        let a = QuadrantMeans([10.0, 10.0, 10.0, 10.0]);
        let b = QuadrantMeans([50.0, 10.0, 5.0, 10.0]);
        assert_eq!(a.manhattan_distance(&b), 45.0);
        assert_eq!(b.manhattan_distance(&a), 45.0);
    }
}
