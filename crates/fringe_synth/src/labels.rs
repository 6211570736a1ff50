//! Ground-truth label streams.
//!
//! Two append-only text streams are written per run:
//! - spawn events: the initial fringe-count vector followed by the fringe count of every
//!   circle respawn, all space separated on one line;
//! - per frame: one line per persisted frame with the fringe count of every circle slot
//!   in slot order.
//!
//! Both streams are flushed after every frame so an aborted run leaves complete lines.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File locations of a run's label streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPaths {
    pub spawn_events: PathBuf,
    pub per_frame: PathBuf,
}

impl LabelPaths {
    pub fn new(dir: &Path, tag: &str) -> Self {
        Self {
            spawn_events: dir.join(format!("fringe_spawns_{tag}.txt")),
            per_frame: dir.join(format!("fringe_frames_{tag}.txt")),
        }
    }
}

pub struct LabelStreams<W: Write> {
    spawn_events: W,
    per_frame: W,
    spawn_entries: usize,
    frame_lines: usize,
    finished: bool,
}

impl LabelStreams<BufWriter<File>> {
    /// Creates (truncating) both label files in `dir`.
    pub fn create(dir: &Path, tag: &str) -> Result<(Self, LabelPaths)> {
        std::fs::create_dir_all(dir)?;
        let paths = LabelPaths::new(dir, tag);
        let spawn_events = BufWriter::new(File::create(&paths.spawn_events)?);
        let per_frame = BufWriter::new(File::create(&paths.per_frame)?);
        Ok((Self::new(spawn_events, per_frame), paths))
    }
}

impl<W: Write> LabelStreams<W> {
    pub fn new(spawn_events: W, per_frame: W) -> Self {
        Self {
            spawn_events,
            per_frame,
            spawn_entries: 0,
            frame_lines: 0,
            finished: false,
        }
    }

    fn push_spawn(&mut self, fringe_count: u32) -> Result<()> {
        if self.spawn_entries > 0 {
            self.spawn_events.write_all(b" ")?;
        }
        write!(self.spawn_events, "{fringe_count}")?;
        self.spawn_entries += 1;
        Ok(())
    }

    /// Writes the fringe counts of the initial population.
    pub fn write_header(&mut self, counts: &[u32]) -> Result<()> {
        for &c in counts {
            self.push_spawn(c)?;
        }
        self.spawn_events.flush()?;
        Ok(())
    }

    /// Appends the fringe count of a respawned circle.
    pub fn record_spawn(&mut self, fringe_count: u32) -> Result<()> {
        self.push_spawn(fringe_count)
    }

    /// Appends one per-frame line and flushes both streams.
    pub fn record_frame(&mut self, counts: &[u32]) -> Result<()> {
        let mut line = String::with_capacity(counts.len() * 3);
        for (i, c) in counts.iter().enumerate() {
            if i > 0 {
                line.push(' ');
            }
            line.push_str(&c.to_string());
        }
        line.push('\n');
        self.per_frame.write_all(line.as_bytes())?;
        self.frame_lines += 1;
        self.per_frame.flush()?;
        self.spawn_events.flush()?;
        Ok(())
    }

    /// Terminates the spawn-events line and flushes. Later calls are no-ops.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.spawn_events.write_all(b"\n")?;
        self.spawn_events.flush()?;
        self.per_frame.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Values written to the spawn-events stream so far, header included.
    pub fn spawn_entries(&self) -> usize {
        self.spawn_entries
    }

    pub fn frame_lines(&self) -> usize {
        self.frame_lines
    }

    pub fn into_inner(self) -> (W, W) {
        (self.spawn_events, self.per_frame)
    }
}
