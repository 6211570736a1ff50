#![forbid(unsafe_code)]
//! fringe_synth: Labeled synthetic interference-fringe video sequences.
//!
//! Modules:
//! - entity: circles and blobs, slot arena, sampling and motion
//! - render: fringe chords for circles, radial gradients and speckles for blobs
//! - raster: BGR frame buffer and drawing primitives
//! - post: Gaussian blur and rotation
//! - sequence: frame loop, label streams, events
//! - store, encoder: frame persistence and video hand-off
pub mod background;
pub mod config;
pub mod encoder;
pub mod entity;
pub mod error;
pub mod labels;
pub mod post;
pub mod random;
pub mod raster;
pub mod render;
pub mod sequence;
pub mod store;

/// Convenient re-exports for common types. Import with `use fringe_synth::prelude::*;`.
pub mod prelude {
    pub use crate::background::{Background, BackgroundOrigin};
    pub use crate::config::{
        BackgroundSource, BlurConfig, FringeDistribution, OutputConfig, PostProcessConfig,
        SynthConfig,
    };
    pub use crate::encoder::{EncodeRequest, FfmpegEncoder, VideoEncoder};
    pub use crate::entity::{
        Blob, Circle, Entity, EntityRole, EntitySampler, MotionModel, Registry, RespawnCause,
    };
    pub use crate::error::{Error, Result};
    pub use crate::labels::{LabelPaths, LabelStreams};
    pub use crate::post::{gaussian_blur, post_process, rotate_clockwise};
    pub use crate::raster::{Bgr, Frame};
    pub use crate::render::{render_blob, render_circle, render_entities};
    pub use crate::sequence::events::{
        EventSink, FnSink, MultiSink, SequenceEvent, SequenceEventKind, VecSink,
    };
    pub use crate::sequence::runner::{
        compose_frame, RunOutcome, RunSummary, SequenceRunner, StopToken,
    };
    pub use crate::store::{FrameNaming, FrameStore, MemoryFrameStore, PngDirectoryStore};
}
