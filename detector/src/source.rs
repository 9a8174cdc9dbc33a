use image::ImageReader;
use scenecut_common::{Frame, FrameIndex};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extensions picked up when a directory of stills is used as a frame source.
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// An ordered, finite, rewindable sequence of decoded frames.
///
/// Only one detector may traverse a source at a time. Detectors read until
/// `try_read_next` returns `Ok(None)` and then seek back to the start.
pub trait FrameSource {
    /// Returns the next frame, or `None` once the sequence is exhausted.
    fn try_read_next(&mut self) -> Result<Option<Frame>, SourceError>;

    /// Number of frames handed out since the start, i.e. the 1-based index of
    /// the most recently returned frame (0 before the first read).
    fn position(&self) -> FrameIndex;

    fn seek_to_start(&mut self) -> Result<(), SourceError>;
}

/// Frames held in memory.
pub struct MemorySource {
    frames: Vec<Frame>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemorySource {
    fn try_read_next(&mut self) -> Result<Option<Frame>, SourceError> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn position(&self) -> FrameIndex {
        self.cursor as FrameIndex
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }
}

/// A directory of still images, one per frame, played in file-name order.
///
/// Files are decoded lazily, one per `try_read_next` call.
pub struct ImageSequenceSource {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let entries = std::fs::read_dir(dir).map_err(|e| SourceError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && has_frame_extension(&path) {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(SourceError::EmptyDirectory(dir.display().to_string()));
        }
        paths.sort();

        info!(dir = %dir.display(), frames = paths.len(), "image sequence opened");

        Ok(Self {
            dir: dir.to_path_buf(),
            paths,
            cursor: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAME_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

impl FrameSource for ImageSequenceSource {
    fn try_read_next(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(None);
        };

        let image = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| SourceError::Io {
                path: path.display().to_string(),
                source: e,
            })?
            .decode()
            .map_err(|e| SourceError::Decode {
                path: path.display().to_string(),
                source: e,
            })?;

        self.cursor += 1;
        Ok(Some(Frame::from_dynamic(image)))
    }

    fn position(&self) -> FrameIndex {
        self.cursor as FrameIndex
    }

    fn seek_to_start(&mut self) -> Result<(), SourceError> {
        self.cursor = 0;
        Ok(())
    }
}

/// Scope guard for one detection pass.
///
/// The source is seeked back to its start when the guard is dropped, on every
/// exit path. Call [`Rewind::finish`] on the normal path to surface a failed
/// rewind as an error instead of a log line.
pub struct Rewind<'a> {
    source: &'a mut dyn FrameSource,
    armed: bool,
}

impl<'a> Rewind<'a> {
    pub fn new(source: &'a mut dyn FrameSource) -> Self {
        let position = source.position();
        if position != 0 {
            warn!(position, "frame source not at start; pass will begin mid-stream");
        }
        Self {
            source,
            armed: true,
        }
    }

    pub fn read_next(&mut self) -> Result<Option<Frame>, SourceError> {
        self.source.try_read_next()
    }

    pub fn position(&self) -> FrameIndex {
        self.source.position()
    }

    pub fn finish(mut self) -> Result<(), SourceError> {
        self.armed = false;
        self.source.seek_to_start()
    }
}

impl Drop for Rewind<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match self.source.seek_to_start() {
            Ok(()) => debug!("frame source rewound after aborted pass"),
            Err(e) => warn!(error = %e, "failed to rewind frame source"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode frame {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },
    #[error("no image frames found in {0}")]
    EmptyDirectory(String),
}
