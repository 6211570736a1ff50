//! Random draws shared by the sampler, the motion integrator and the blob renderer.
//!
//! Everything takes `&mut dyn RngCore` so a single seeded generator can be threaded
//! through a whole run. Draw order matters for reproducibility: each helper consumes a
//! fixed number of words from the generator.
use rand::RngCore;

/// Generate a random float in the range [0, 1).
///
/// Uses the top 24 bits so the result is exactly representable and never rounds up to 1.
#[inline]
pub fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Draw an integer uniformly from `[lo, hi)`. Returns `lo` when the range is empty.
#[inline]
pub fn uniform_int(rng: &mut dyn RngCore, lo: i32, hi: i32) -> i32 {
    if hi <= lo {
        return lo;
    }
    let span = (hi as i64 - lo as i64) as u64;
    let offset = ((rng.next_u64() as u128 * span as u128) >> 64) as i64;
    (lo as i64 + offset) as i32
}

/// Draw an integer uniformly from `[lo, hi]`.
#[inline]
pub fn uniform_int_inclusive(rng: &mut dyn RngCore, lo: i32, hi: i32) -> i32 {
    if hi < lo {
        return lo;
    }
    uniform_int(rng, lo, hi.saturating_add(1))
}

/// Bernoulli trial with probability `p`.
#[inline]
pub fn chance(rng: &mut dyn RngCore, p: f32) -> bool {
    rand01(rng) < p
}

/// Standard normal deviate via the Box-Muller transform.
pub fn standard_normal(rng: &mut dyn RngCore) -> f32 {
    let u1 = (1.0 - rand01(rng)).clamp(f32::MIN_POSITIVE, 1.0);
    let u2 = rand01(rng);

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * core::f32::consts::PI * u2;

    r * theta.cos()
}

/// Log-normal deviate with shape `sigma` and scale `exp(mean)`.
pub fn log_normal(rng: &mut dyn RngCore, mean: f32, sigma: f32) -> f32 {
    (mean + sigma * standard_normal(rng)).exp()
}
