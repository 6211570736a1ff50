//! Frame persistence.
//!
//! [`PngDirectoryStore`] writes sequentially numbered PNG files into a directory and
//! remembers them so they can be removed after a successful encode.
//! [`MemoryFrameStore`] keeps frames in memory for tests and embedding.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::error::Result;
use crate::raster::Frame;

/// Minimum digits in a frame index.
pub const MIN_INDEX_DIGITS: usize = 3;

/// Sequential, zero-padded frame filenames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameNaming {
    pub prefix: String,
    pub digits: usize,
}

impl FrameNaming {
    /// Padding wide enough for `total_frames` indices.
    pub fn for_total(prefix: impl Into<String>, total_frames: usize) -> Self {
        let last = total_frames.saturating_sub(1);
        let digits = last.to_string().len().max(MIN_INDEX_DIGITS);
        Self {
            prefix: prefix.into(),
            digits,
        }
    }

    pub fn file_name(&self, index: usize) -> String {
        format!("{}{:0width$}.png", self.prefix, index, width = self.digits)
    }

    /// printf-style input pattern for the video encoder.
    pub fn pattern(&self) -> String {
        format!("{}%0{}d.png", self.prefix, self.digits)
    }
}

/// Destination for composited frames.
pub trait FrameStore {
    /// Persists frame `index`, returning its path when it lives on disk.
    fn store(&mut self, index: usize, frame: &Frame) -> Result<Option<PathBuf>>;

    /// Deletes what this store wrote, returning how many frames were removed.
    fn remove_stored(&mut self) -> Result<usize>;
}

pub struct PngDirectoryStore {
    dir: PathBuf,
    naming: FrameNaming,
    written: Vec<PathBuf>,
}

impl PngDirectoryStore {
    /// Creates `dir` if needed.
    pub fn create(dir: impl Into<PathBuf>, naming: FrameNaming) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            naming,
            written: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn naming(&self) -> &FrameNaming {
        &self.naming
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// Writes `frame` as an RGB PNG with fast compression.
pub fn write_png(path: &Path, frame: &Frame) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder =
        PngEncoder::new_with_quality(&mut writer, CompressionType::Fast, FilterType::Adaptive);
    let img = frame.as_image();
    encoder.write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
    writer.flush()?;
    Ok(())
}

impl FrameStore for PngDirectoryStore {
    fn store(&mut self, index: usize, frame: &Frame) -> Result<Option<PathBuf>> {
        let path = self.dir.join(self.naming.file_name(index));
        write_png(&path, frame)?;
        self.written.push(path.clone());
        Ok(Some(path))
    }

    /// Deletes newest first. A failed deletion leaves that path and every older one
    /// in [`Self::written`].
    fn remove_stored(&mut self) -> Result<usize> {
        let mut removed = 0;
        while let Some(path) = self.written.pop() {
            if let Err(e) = std::fs::remove_file(&path) {
                self.written.push(path);
                return Err(e.into());
            }
            removed += 1;
        }
        debug!("Removed {} frame files from '{}'.", removed, self.dir.display());
        Ok(removed)
    }
}

/// Keeps every stored frame in memory.
#[derive(Debug, Default)]
pub struct MemoryFrameStore {
    frames: Vec<Frame>,
}

impl MemoryFrameStore {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

impl FrameStore for MemoryFrameStore {
    fn store(&mut self, _index: usize, frame: &Frame) -> Result<Option<PathBuf>> {
        self.frames.push(frame.clone());
        Ok(None)
    }

    fn remove_stored(&mut self) -> Result<usize> {
        let count = self.frames.len();
        self.frames.clear();
        Ok(count)
    }
}
