use image::{DynamicImage, GrayImage, RgbImage};

/// 1-based position of a frame within the decoded sequence.
///
/// This is the value a frame source reports after handing out a frame, so the
/// first frame of a video is `1`. All cut locations are expressed in this unit.
pub type FrameIndex = u64;

/// The pixel layout carried inside a frame.
#[derive(Debug, Clone)]
pub enum FramePixels {
    /// Single-channel 8-bit intensity plane.
    Gray(GrayImage),
    /// Interleaved 8-bit RGB.
    Rgb(RgbImage),
}

/// One decoded video frame.
///
/// Frames are read-only to the detectors: they derive a feature from the
/// buffer and drop it before asking the source for the next one.
#[derive(Debug, Clone)]
pub struct Frame {
    pub pixels: FramePixels,
}

impl Frame {
    pub fn gray(image: GrayImage) -> Self {
        Self {
            pixels: FramePixels::Gray(image),
        }
    }

    pub fn rgb(image: RgbImage) -> Self {
        Self {
            pixels: FramePixels::Rgb(image),
        }
    }

    /// Build a frame from whatever the decoder produced.
    ///
    /// Luma images stay single-channel. Everything else is narrowed to 8-bit
    /// RGB, dropping alpha.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::gray(gray),
            DynamicImage::ImageRgb8(rgb) => Self::rgb(rgb),
            other @ (DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLumaA16(_)) => Self::gray(other.to_luma8()),
            other => Self::rgb(other.to_rgb8()),
        }
    }

    // -- Convenience accessors --------------------------------------------------

    pub fn width(&self) -> u32 {
        match &self.pixels {
            FramePixels::Gray(img) => img.width(),
            FramePixels::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match &self.pixels {
            FramePixels::Gray(img) => img.height(),
            FramePixels::Rgb(img) => img.height(),
        }
    }

    /// Number of interleaved samples per pixel (1 or 3).
    pub fn channels(&self) -> usize {
        match &self.pixels {
            FramePixels::Gray(_) => 1,
            FramePixels::Rgb(_) => 3,
        }
    }

    /// Raw row-major interleaved samples.
    pub fn samples(&self) -> &[u8] {
        match &self.pixels {
            FramePixels::Gray(img) => img.as_raw(),
            FramePixels::Rgb(img) => img.as_raw(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Single-channel intensity plane, via `imageops::grayscale` for colour frames.
    pub fn to_luma(&self) -> GrayImage {
        match &self.pixels {
            FramePixels::Gray(img) => img.clone(),
            FramePixels::Rgb(img) => image::imageops::grayscale(img),
        }
    }
}
