//! Stochastic per-tick motion and respawn triggering.
//!
//! Each tick a slot moves by `velocity_scale * dt * intensity * 10 * u` per axis, with a
//! fresh `u ~ U[0, 1)` on each axis, and the new coordinate is truncated to whole
//! pixels. A slot respawns when it leaves `[0, width] x [0, height]` or when the
//! per-tick disappearance draw fires.
use glam::{IVec2, UVec2, Vec2};
use rand::RngCore;

use crate::config::SynthConfig;
use crate::entity::{Entity, EntitySampler};
use crate::random::{chance, rand01};

/// Constant gain between velocity scale and displacement.
pub const DISPLACEMENT_GAIN: f32 = 10.0;

/// Why a slot was resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RespawnCause {
    OutOfBounds,
    Disappeared,
}

/// `true` when `p` lies strictly outside `[0, canvas.x] x [0, canvas.y]`.
#[inline]
pub fn is_outside(p: IVec2, canvas: UVec2) -> bool {
    p.x < 0 || p.y < 0 || p.x as i64 > canvas.x as i64 || p.y as i64 > canvas.y as i64
}

/// Biased random walk shared by every entity of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionModel {
    pub velocity_scale: Vec2,
    pub dt: f32,
    pub disappearance_probability: f32,
}

impl MotionModel {
    pub fn from_config(config: &SynthConfig) -> Self {
        Self {
            velocity_scale: config.velocity_scale,
            dt: config.dt(),
            disappearance_probability: config.disappearance_probability,
        }
    }

    /// Upper bound of the per-axis displacement magnitude for `intensity`.
    pub fn max_step(&self, intensity: f32) -> Vec2 {
        (self.velocity_scale * self.dt * intensity * DISPLACEMENT_GAIN).abs()
    }

    /// One displacement draw (x first, then y).
    pub fn step(&self, position: IVec2, intensity: f32, rng: &mut dyn RngCore) -> IVec2 {
        let gain = self.velocity_scale * self.dt * intensity * DISPLACEMENT_GAIN;
        let x = (position.x as f32 + gain.x * rand01(rng)).trunc() as i32;
        let y = (position.y as f32 + gain.y * rand01(rng)).trunc() as i32;
        IVec2::new(x, y)
    }

    /// Moves `entity` one tick and resamples it in place if a respawn fires.
    ///
    /// The disappearance draw is only taken while the entity is still in bounds.
    pub fn advance<E: Entity>(
        &self,
        entity: &mut E,
        canvas: UVec2,
        sampler: &EntitySampler,
        rng: &mut dyn RngCore,
    ) -> Option<RespawnCause> {
        let next = self.step(entity.position(), entity.intensity(), rng);
        entity.set_position(next);

        let cause = if is_outside(next, canvas) {
            Some(RespawnCause::OutOfBounds)
        } else if chance(rng, self.disappearance_probability) {
            Some(RespawnCause::Disappeared)
        } else {
            None
        };

        if cause.is_some() {
            *entity = E::sample(sampler, canvas, rng);
        }
        cause
    }
}
