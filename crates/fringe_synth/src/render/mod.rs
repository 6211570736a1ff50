//! Compositing entities onto a frame.
//!
//! Circles are drawn first, then blobs, each in slot order. Blob speckles consume
//! draws from the run's random source, so rendering is part of the deterministic draw
//! sequence of a tick.
use rand::RngCore;

use crate::entity::Registry;
use crate::raster::Frame;

pub mod blob;
pub mod circle;

pub use blob::{render_blob, shade_blob, speckle_points, GradientTable};
pub use circle::{fringe_chords, render_circle, FringeChord};

/// Draws every live circle, then every live blob.
pub fn render_entities(frame: &mut Frame, registry: &Registry, rng: &mut dyn RngCore) {
    for (_, circle) in registry.circles.iter() {
        render_circle(frame, circle);
    }
    for (_, blob) in registry.blobs.iter() {
        render_blob(frame, blob, rng);
    }
}
