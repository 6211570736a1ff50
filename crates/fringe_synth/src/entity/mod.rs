//! Entities drawn into every frame: fringed circles and gradient blobs.
//!
//! Entities live in fixed slots of a [`Registry`]; a respawn overwrites the slot in
//! place so the number of live entities never changes during a run.
use glam::{IVec2, UVec2};
use rand::RngCore;

use crate::raster::Bgr;

pub mod arena;
pub mod motion;
pub mod sampler;

pub use arena::{Registry, SlotArena};
pub use motion::{is_outside, MotionModel, RespawnCause};
pub use sampler::EntitySampler;

/// Which registry an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRole {
    Circle,
    Blob,
}

/// A particle disk carrying `fringe_count` interference chords.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub position: IVec2,
    pub radius: i32,
    /// Fixed for the entity's lifetime; this is the ground-truth label.
    pub fringe_count: u32,
    /// Scales the per-tick displacement.
    pub intensity: f32,
    /// Blue channel of the disk colour.
    pub fill_level: u8,
}

impl Circle {
    pub fn color(&self) -> Bgr {
        Bgr::new(self.fill_level, 100, 0)
    }
}

/// A soft disk shaded with a radial gradient and a speckle highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub position: IVec2,
    pub radius: i32,
    pub color: Bgr,
    pub intensity: f32,
}

/// Common surface used by the motion integrator.
pub trait Entity: Sized {
    const ROLE: EntityRole;

    fn position(&self) -> IVec2;
    fn set_position(&mut self, position: IVec2);
    fn intensity(&self) -> f32;

    /// Draws a fresh entity of the same role.
    fn sample(sampler: &EntitySampler, canvas: UVec2, rng: &mut dyn RngCore) -> Self;
}

impl Entity for Circle {
    const ROLE: EntityRole = EntityRole::Circle;

    fn position(&self) -> IVec2 {
        self.position
    }

    fn set_position(&mut self, position: IVec2) {
        self.position = position;
    }

    fn intensity(&self) -> f32 {
        self.intensity
    }

    fn sample(sampler: &EntitySampler, canvas: UVec2, rng: &mut dyn RngCore) -> Self {
        sampler.sample_circle(canvas, rng)
    }
}

impl Entity for Blob {
    const ROLE: EntityRole = EntityRole::Blob;

    fn position(&self) -> IVec2 {
        self.position
    }

    fn set_position(&mut self, position: IVec2) {
        self.position = position;
    }

    fn intensity(&self) -> f32 {
        self.intensity
    }

    fn sample(sampler: &EntitySampler, canvas: UVec2, rng: &mut dyn RngCore) -> Self {
        sampler.sample_blob(canvas, rng)
    }
}
