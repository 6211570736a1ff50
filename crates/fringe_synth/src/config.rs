//! Run configuration for a synthetic sequence.
//!
//! A [`SynthConfig`] is immutable for the duration of a run. Build it from
//! [`SynthConfig::default`] with the `with_*` methods and check it with
//! [`SynthConfig::validate`]; [`crate::sequence::runner::SequenceRunner::try_new`] validates
//! before touching the filesystem.
use std::path::PathBuf;

use glam::{UVec2, Vec2};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default canvas resolution (width, height) before any rotation.
pub const DEFAULT_RESOLUTION: UVec2 = UVec2::new(2048, 1024);

/// Spawn margin as a multiple of the maximum radius.
pub const SPAWN_MARGIN_FACTOR: f32 = 1.5;

/// Log-normal distribution of the per-circle fringe count.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FringeDistribution {
    /// Mean of the underlying normal; the scale is `exp(mean)`.
    pub mean: f32,
    /// Shape (standard deviation of the underlying normal).
    pub sigma: f32,
}

impl Default for FringeDistribution {
    fn default() -> Self {
        Self {
            mean: 1.5,
            sigma: 0.5,
        }
    }
}

/// Gaussian blur settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurConfig {
    /// Kernel half-width; the kernel is `2 * radius + 1` taps on each axis.
    pub radius: u32,
    /// Standard deviation in pixels. Values `<= 0` derive sigma from the kernel size.
    pub sigma: f32,
}

impl BlurConfig {
    pub fn new(radius: u32) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    pub fn with_sigma(mut self, sigma: f32) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn kernel_size(&self) -> usize {
        2 * self.radius as usize + 1
    }

    /// Sigma actually applied by the blur.
    pub fn effective_sigma(&self) -> f32 {
        if self.sigma > 0.0 {
            self.sigma
        } else {
            let k = self.kernel_size() as f32;
            0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
        }
    }
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            radius: 5,
            sigma: 4.0,
        }
    }
}

/// Post-processing applied to each composited frame, blur first.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostProcessConfig {
    pub blur: Option<BlurConfig>,
    /// Rotate 90 degrees clockwise (swaps width and height of the output).
    pub rotate: bool,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            blur: Some(BlurConfig::default()),
            rotate: true,
        }
    }
}

impl PostProcessConfig {
    /// No blur, no rotation.
    pub fn none() -> Self {
        Self {
            blur: None,
            rotate: false,
        }
    }
}

/// Source of the base frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackgroundSource {
    /// All-zero canvas of the configured resolution.
    #[default]
    Blank,
    /// Image file; falls back to a blank canvas if it cannot be read.
    Image(PathBuf),
}

/// Where frames, labels and the optional video end up.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub frame_dir: PathBuf,
    pub label_dir: PathBuf,
    /// Frame filename prefix, followed by the zero-padded index.
    pub frame_prefix: String,
    /// Video container to produce when an encoder runs. `None` writes
    /// `video_{tag}.avi` into `label_dir`.
    pub video: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frame_dir: PathBuf::from("frames"),
            label_dir: PathBuf::from("."),
            frame_prefix: "frame".into(),
            video: None,
        }
    }
}

impl OutputConfig {
    pub fn new(frame_dir: impl Into<PathBuf>, label_dir: impl Into<PathBuf>) -> Self {
        Self {
            frame_dir: frame_dir.into(),
            label_dir: label_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_frame_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.frame_prefix = prefix.into();
        self
    }

    pub fn with_video(mut self, video: impl Into<PathBuf>) -> Self {
        self.video = Some(video.into());
        self
    }
}

/// Complete description of one synthetic sequence.
#[non_exhaustive]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Canvas size (width, height) used when no background image dictates it.
    pub resolution: UVec2,
    /// Smallest entity radius (inclusive).
    pub radius_min: i32,
    /// Largest entity radius (exclusive); also sets the spawn margin.
    pub radius_max: i32,
    /// Per-axis velocity scale in pixels per second.
    pub velocity_scale: Vec2,
    pub fps: u32,
    pub duration_secs: u32,
    pub circle_count: usize,
    pub blob_count: usize,
    pub fringes: FringeDistribution,
    /// Per-tick probability that a live entity disappears and respawns.
    pub disappearance_probability: f32,
    pub post: PostProcessConfig,
    pub background: BackgroundSource,
    pub output: OutputConfig,
    /// Seed for the run's random source. `None` draws one from the clock.
    pub seed: Option<u64>,
    /// Names the label files and default video. `None` draws one from the random source.
    pub run_tag: Option<String>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            radius_min: 30,
            radius_max: 80,
            velocity_scale: Vec2::new(20.0, 10.0),
            fps: 30,
            duration_secs: 4,
            circle_count: 20,
            blob_count: 5,
            fringes: FringeDistribution::default(),
            disappearance_probability: 0.05,
            post: PostProcessConfig::default(),
            background: BackgroundSource::Blank,
            output: OutputConfig::default(),
            seed: None,
            run_tag: None,
        }
    }
}

impl SynthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = UVec2::new(width, height);
        self
    }

    pub fn with_radius_range(mut self, radius_min: i32, radius_max: i32) -> Self {
        self.radius_min = radius_min;
        self.radius_max = radius_max;
        self
    }

    pub fn with_velocity_scale(mut self, velocity_scale: Vec2) -> Self {
        self.velocity_scale = velocity_scale;
        self
    }

    pub fn with_timing(mut self, fps: u32, duration_secs: u32) -> Self {
        self.fps = fps;
        self.duration_secs = duration_secs;
        self
    }

    pub fn with_counts(mut self, circle_count: usize, blob_count: usize) -> Self {
        self.circle_count = circle_count;
        self.blob_count = blob_count;
        self
    }

    pub fn with_fringes(mut self, fringes: FringeDistribution) -> Self {
        self.fringes = fringes;
        self
    }

    pub fn with_disappearance_probability(mut self, p: f32) -> Self {
        self.disappearance_probability = p;
        self
    }

    pub fn with_post(mut self, post: PostProcessConfig) -> Self {
        self.post = post;
        self
    }

    pub fn with_background(mut self, background: BackgroundSource) -> Self {
        self.background = background;
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_run_tag(mut self, tag: impl Into<String>) -> Self {
        self.run_tag = Some(tag.into());
        self
    }

    /// Total number of frames in the sequence.
    pub fn total_frames(&self) -> usize {
        self.fps as usize * self.duration_secs as usize
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Pixels kept free between a freshly spawned entity and the canvas edge.
    pub fn spawn_margin(&self) -> f32 {
        self.radius_max as f32 * SPAWN_MARGIN_FACTOR
    }

    /// Random source for this run, seeded from [`Self::seed`] or the OS-seeded thread rng.
    pub fn rng(&self) -> StdRng {
        let seed = self.seed.unwrap_or_else(|| rand::rng().next_u64());
        StdRng::seed_from_u64(seed)
    }

    /// Largest fringe count a circle can carry: one chord per pixel column of the widest disk.
    pub fn max_fringe_count(&self) -> u32 {
        (self.radius_max.max(0) as u32).saturating_mul(2)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.resolution.x == 0 || self.resolution.y == 0 {
            return Err(Error::InvalidConfig(
                "resolution must be > 0 in both components".into(),
            ));
        }
        if self.radius_min < 1 {
            return Err(Error::InvalidConfig("radius_min must be >= 1".into()));
        }
        if self.radius_min >= self.radius_max {
            return Err(Error::InvalidConfig(format!(
                "radius_min ({}) must be < radius_max ({})",
                self.radius_min, self.radius_max
            )));
        }
        if self.fps == 0 {
            return Err(Error::InvalidConfig("fps must be > 0".into()));
        }
        if self.duration_secs == 0 {
            return Err(Error::InvalidConfig("duration_secs must be > 0".into()));
        }
        if !self.velocity_scale.is_finite() {
            return Err(Error::InvalidConfig("velocity_scale must be finite".into()));
        }
        if !self.fringes.mean.is_finite()
            || !self.fringes.sigma.is_finite()
            || self.fringes.sigma < 0.0
        {
            return Err(Error::InvalidConfig(
                "fringe distribution needs a finite mean and a finite sigma >= 0".into(),
            ));
        }
        let median_fringes = self.fringes.mean.exp();
        if median_fringes > self.max_fringe_count() as f32 {
            return Err(Error::InvalidConfig(format!(
                "fringe median exp({}) = {} exceeds {} chords (2 * radius_max)",
                self.fringes.mean,
                median_fringes,
                self.max_fringe_count()
            )));
        }
        if !(0.0..=1.0).contains(&self.disappearance_probability) {
            return Err(Error::InvalidConfig(
                "disappearance_probability must be within [0, 1]".into(),
            ));
        }
        if let Some(blur) = self.post.blur {
            if !blur.sigma.is_finite() {
                return Err(Error::InvalidConfig("blur sigma must be finite".into()));
            }
        }
        self.validate_canvas(self.resolution)
    }

    /// Checks that `canvas` leaves a non-empty spawn range on both axes.
    pub fn validate_canvas(&self, canvas: UVec2) -> Result<()> {
        let (lo, hi) = spawn_range(self.spawn_margin(), canvas);
        if lo.x >= hi.x || lo.y >= hi.y {
            return Err(Error::InvalidConfig(format!(
                "canvas {}x{} leaves no spawn region for a margin of {} px (1.5 * radius_max)",
                canvas.x,
                canvas.y,
                self.spawn_margin()
            )));
        }
        Ok(())
    }
}

/// Per-axis spawn range `[lo, hi)` in whole pixels.
pub fn spawn_range(margin: f32, canvas: UVec2) -> (glam::IVec2, glam::IVec2) {
    let lo = margin as i32;
    let hi_x = (canvas.x as f32 - margin) as i32;
    let hi_y = (canvas.y as f32 - margin) as i32;
    (glam::IVec2::splat(lo), glam::IVec2::new(hi_x, hi_y))
}
