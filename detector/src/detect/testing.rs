use image::{GrayImage, Luma};
use scenecut_common::{Frame, FrameIndex};

use crate::source::{FrameSource, MemorySource, SourceError};

pub fn uniform(value: u8) -> Frame {
    Frame::gray(GrayImage::from_pixel(8, 8, Luma([value])))
}

/// One uniform 8x8 frame per entry, so each frame's mean is the entry.
pub fn source_with_means(means: &[u8]) -> MemorySource {
    MemorySource::new(means.iter().map(|&m| uniform(m)).collect())
}

/// Serves the wrapped frames, then fails instead of reporting exhaustion.
pub struct FailingSource {
    inner: MemorySource,
}

impl FailingSource {
    pub fn new(means: &[u8]) -> Self {
        Self {
            inner: source_with_means(means),
        }
    }
}

impl FrameSource for FailingSource {
    fn try_read_next(&mut self) -> Result<Option<Frame>, SourceError> {
        match self.inner.try_read_next()? {
            Some(frame) => Ok(Some(frame)),
            None => Err(SourceError::Io {
                path: "broken-stream".into(),
                source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated"),
            }),
        }
    }

    fn position(&self) -> FrameIndex {
        self.inner.position()
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.inner.seek_to_start()
    }
}
