use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::dilate;
use scenecut_common::Frame;

/// Hysteresis thresholds on the L1 Sobel magnitude (range 0..=2040).
pub const CANNY_LOW: f32 = 0.0;
pub const CANNY_HIGH: f32 = 500.0;

/// tan(22.5°) and tan(67.5°), the sector borders for gradient direction.
const TAN_22_5: f32 = 0.414_213_56;
const TAN_67_5: f32 = 2.414_213_6;

/// Binary edge map with the same shape as its source frame.
///
/// Values are 0 or 1, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl EdgeMap {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y) as u8);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize] != 0
    }

    pub fn edge_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// 0/255 mask of the map.
    fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Every non-zero pixel of `mask` becomes an edge.
    fn from_image(mask: &GrayImage) -> Self {
        Self {
            width: mask.width(),
            height: mask.height(),
            data: mask.as_raw().iter().map(|&v| (v > 0) as u8).collect(),
        }
    }

    fn same_shape(&self, other: &EdgeMap) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// How to widen an edge map so slightly shifted edges still overlap.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Expansion {
    /// One pass of 3x3 (8-neighbourhood) dilation. Exact.
    #[default]
    Dilate,
    /// Gaussian blur of the map, every non-zero result kept. Approximate.
    Blur { sigma: f32 },
}

pub const DEFAULT_BLUR_SIGMA: f32 = 1.0;

/// Edge map of the frame's luma plane with the fixed 0 / 500 thresholds.
pub fn edge_map(frame: &Frame) -> EdgeMap {
    canny(&frame.to_luma(), CANNY_LOW, CANNY_HIGH)
}

/// Canny edge detection on Sobel gradients: L1 magnitude, non-maximum
/// suppression and hysteresis between `low` and `high`.
///
/// No smoothing pass runs first. Border pixels never carry an edge.
pub fn canny(gray: &GrayImage, low: f32, high: f32) -> EdgeMap {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w < 3 || h < 3 {
        return EdgeMap::empty(width, height);
    }

    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let (gx, gy) = (gx.as_raw(), gy.as_raw());
    let magnitude: Vec<f32> = gx
        .iter()
        .zip(gy.iter())
        .map(|(&x, &y)| (x as i32).abs() as f32 + (y as i32).abs() as f32)
        .collect();

    // 0 = suppressed, 1 = weak, 2 = strong
    let mut class = vec![0u8; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = magnitude[i];
            if m <= low {
                continue;
            }
            let ax = (gx[i] as i32).abs() as f32;
            let ay = (gy[i] as i32).abs() as f32;
            let (a, b) = if ay <= ax * TAN_22_5 {
                (i - 1, i + 1)
            } else if ay >= ax * TAN_67_5 {
                (i - w, i + w)
            } else if (gx[i] > 0) == (gy[i] > 0) {
                (i - w - 1, i + w + 1)
            } else {
                (i - w + 1, i + w - 1)
            };
            if m > magnitude[a] && m >= magnitude[b] {
                class[i] = if m > high { 2 } else { 1 };
            }
        }
    }

    let mut data = vec![0u8; w * h];
    let mut stack: Vec<usize> = class
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == 2)
        .map(|(i, _)| i)
        .collect();
    for &i in &stack {
        data[i] = 1;
    }
    while let Some(i) = stack.pop() {
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let n = ny * w + nx;
                if class[n] == 1 && data[n] == 0 {
                    data[n] = 1;
                    stack.push(n);
                }
            }
        }
    }

    EdgeMap {
        width,
        height,
        data,
    }
}

/// Tolerance-widened copy of `edges`.
///
/// Panics if a blur sigma is not positive.
pub fn expand(edges: &EdgeMap, how: Expansion) -> EdgeMap {
    if edges.data.is_empty() {
        return edges.clone();
    }
    let widened = match how {
        Expansion::Dilate => dilate(&edges.to_image(), Norm::LInf, 1),
        Expansion::Blur { sigma } => gaussian_blur_f32(&edges.to_image(), sigma),
    };
    EdgeMap::from_image(&widened)
}

/// Percentage of the area outside `expanded_prev` that is covered by
/// `edges`: `100 * |edges ∧ ¬prev| / |¬prev|`.
///
/// High values mean the current frame has structure where the previous one
/// had none. Returns 0 when `expanded_prev` covers the whole frame, and
/// `None` when the two maps differ in shape.
pub fn overlap_score(edges: &EdgeMap, expanded_prev: &EdgeMap) -> Option<f64> {
    if !edges.same_shape(expanded_prev) {
        return None;
    }
    let mut outside = 0u64;
    let mut new_edges = 0u64;
    for (&e, &p) in edges.data.iter().zip(expanded_prev.data.iter()) {
        if p == 0 {
            outside += 1;
            new_edges += e as u64;
        }
    }
    if outside == 0 {
        return Some(0.0);
    }
    Some(new_edges as f64 / outside as f64 * 100.0)
}
