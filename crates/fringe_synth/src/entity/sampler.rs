//! Fresh circle and blob draws.
use glam::{IVec2, UVec2};
use rand::RngCore;

use crate::config::{spawn_range, FringeDistribution, SynthConfig};
use crate::entity::{Blob, Circle};
use crate::random::{log_normal, rand01, uniform_int, uniform_int_inclusive};
use crate::raster::Bgr;

/// Base of the circle fill level; the blue channel is `FILL_BASE + [0, FILL_SPREAD)`.
pub const FILL_BASE: u8 = 170;
pub const FILL_SPREAD: i32 = 70;
/// Inclusive range of each blob colour channel.
pub const BLOB_CHANNEL_RANGE: (i32, i32) = (50, 200);

/// Draws entities with randomized geometry, kinematics and appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySampler {
    pub radius_min: i32,
    pub radius_max: i32,
    pub margin: f32,
    pub fringes: FringeDistribution,
    /// Upper clamp for drawn fringe counts.
    pub max_fringes: u32,
}

impl EntitySampler {
    pub fn from_config(config: &SynthConfig) -> Self {
        Self {
            radius_min: config.radius_min,
            radius_max: config.radius_max,
            margin: config.spawn_margin(),
            fringes: config.fringes,
            max_fringes: config.max_fringe_count(),
        }
    }

    fn position(&self, canvas: UVec2, rng: &mut dyn RngCore) -> IVec2 {
        let (lo, hi) = spawn_range(self.margin, canvas);
        let x = uniform_int(rng, lo.x, hi.x);
        let y = uniform_int(rng, lo.y, hi.y);
        IVec2::new(x, y)
    }

    /// Fringe count drawn from the log-normal, rounded to the nearest integer and clamped
    /// to [`Self::max_fringes`].
    pub fn fringe_count(&self, rng: &mut dyn RngCore) -> u32 {
        let v = log_normal(rng, self.fringes.mean, self.fringes.sigma);
        v.round().clamp(0.0, self.max_fringes as f32) as u32
    }

    pub fn sample_circle(&self, canvas: UVec2, rng: &mut dyn RngCore) -> Circle {
        let position = self.position(canvas, rng);
        let radius = uniform_int(rng, self.radius_min, self.radius_max);
        let fill_level = FILL_BASE + uniform_int(rng, 0, FILL_SPREAD) as u8;
        let fringe_count = self.fringe_count(rng);
        let intensity = rand01(rng) * self.radius_max as f32 / radius as f32;
        Circle {
            position,
            radius,
            fringe_count,
            intensity,
            fill_level,
        }
    }

    pub fn sample_blob(&self, canvas: UVec2, rng: &mut dyn RngCore) -> Blob {
        let position = self.position(canvas, rng);
        let radius = uniform_int(rng, self.radius_min, self.radius_max);
        let (lo, hi) = BLOB_CHANNEL_RANGE;
        let b = uniform_int_inclusive(rng, lo, hi) as u8;
        let g = uniform_int_inclusive(rng, lo, hi) as u8;
        let r = uniform_int_inclusive(rng, lo, hi) as u8;
        let intensity = rand01(rng);
        Blob {
            position,
            radius,
            color: Bgr::new(b, g, r),
            intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn sampler() -> (EntitySampler, UVec2) {
        let cfg = SynthConfig::default()
            .with_resolution(640, 360)
            .with_radius_range(20, 40);
        (EntitySampler::from_config(&cfg), cfg.resolution)
    }

    #[test]
    fn circles_spawn_inside_margin_with_valid_attributes() {
        let (s, canvas) = sampler();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let c = s.sample_circle(canvas, &mut rng);
            assert!(c.position.x >= 60 && c.position.x < 580);
            assert!(c.position.y >= 60 && c.position.y < 300);
            assert!((20..40).contains(&c.radius));
            assert!((170..240).contains(&c.fill_level));
            let max_ib = 40.0 / c.radius as f32;
            assert!(c.intensity >= 0.0 && c.intensity < max_ib);
        }
    }

    #[test]
    fn blobs_have_channels_in_range_and_unit_intensity() {
        let (s, canvas) = sampler();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let b = s.sample_blob(canvas, &mut rng);
            assert!(b.color.0.iter().all(|&c| (50..=200).contains(&c)));
            assert!((0.0..1.0).contains(&b.intensity));
            assert!((20..40).contains(&b.radius));
        }
    }

    #[test]
    fn fringe_counts_cluster_around_scale() {
        let (s, _) = sampler();
        let mut rng = StdRng::seed_from_u64(9);
        let n = 2000;
        let total: u32 = (0..n).map(|_| s.fringe_count(&mut rng)).sum();
        let mean = total as f32 / n as f32;
        // exp(1.5 + 0.5^2 / 2) ~= 5.08
        assert!((4.5..5.7).contains(&mean), "mean fringe count {mean}");
    }

    #[test]
    fn zero_sigma_gives_constant_fringe_count() {
        let (mut s, _) = sampler();
        s.fringes = FringeDistribution {
            mean: 1.5,
            sigma: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(10);
        // exp(1.5) = 4.48 -> 4
        assert!((0..50).all(|_| s.fringe_count(&mut rng) == 4));
    }

    #[test]
    fn fringe_tail_is_clamped_to_disk_width() {
        let (mut s, _) = sampler();
        assert_eq!(s.max_fringes, 80);
        s.fringes = FringeDistribution {
            mean: 30.0,
            sigma: 0.0,
        };
        let mut rng = StdRng::seed_from_u64(12);
        assert_eq!(s.fringe_count(&mut rng), 80);
    }

    #[test]
    fn same_seed_same_entities() {
        let (s, canvas) = sampler();
        let a = s.sample_circle(canvas, &mut StdRng::seed_from_u64(3));
        let b = s.sample_circle(canvas, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
