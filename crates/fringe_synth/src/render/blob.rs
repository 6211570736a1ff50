//! Gradient-shaded blobs with a bright speckle.
use glam::IVec2;
use rand::RngCore;
use tracing::trace;

use crate::entity::Blob;
use crate::random::uniform_int_inclusive;
use crate::raster::draw::{fill_disk, fill_polygon};
use crate::raster::{Bgr, Frame};

/// Points in a speckle polygon.
pub const SPECKLE_POINTS: usize = 10;
pub const SPECKLE_COLOR: Bgr = Bgr::new(250, 250, 250);
/// Rejection-sampling budget per blob.
pub const MAX_SPECKLE_DRAWS: usize = 10_000;

/// Radial colour ramp of a blob, indexed by `k` in `[0, radius)`.
///
/// Channels 0 and 1 fade from the base colour to black as `k` grows while channel 2
/// fades in: entry `k` is `(b * (r - k) / r, g * (r - k) / r, red * k / r)`, truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientTable {
    entries: Vec<Bgr>,
}

impl GradientTable {
    pub fn new(base: Bgr, radius: i32) -> Self {
        let r = radius.max(0) as u32;
        let [b, g, red] = base.0.map(u32::from);
        let entries = (0..r)
            .map(|k| {
                Bgr::new(
                    (b * (r - k) / r) as u8,
                    (g * (r - k) / r) as u8,
                    (red * k / r) as u8,
                )
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<Bgr> {
        self.entries.get(k).copied()
    }

    pub fn entries(&self) -> &[Bgr] {
        &self.entries
    }

    /// Table index for a pixel at squared distance `d2` from the centre:
    /// `radius - floor(distance)`, clamped to `[0, radius - 1]`.
    pub fn index_for(&self, d2: i64) -> usize {
        let last = self.entries.len().saturating_sub(1) as i64;
        let distance = (d2 as f64).sqrt().floor() as i64;
        (self.entries.len() as i64 - distance).clamp(0, last) as usize
    }
}

/// Up to [`SPECKLE_POINTS`] points inside the blob's disk, in draw order.
///
/// Candidates are drawn from the bounding square (x then y, inclusive bounds) and kept
/// when inside the disk. Duplicates are allowed. Stops early after
/// [`MAX_SPECKLE_DRAWS`] candidates.
pub fn speckle_points(center: IVec2, radius: i32, rng: &mut dyn RngCore) -> Vec<IVec2> {
    let r2 = radius as i64 * radius as i64;
    let mut points = Vec::with_capacity(SPECKLE_POINTS);
    for _ in 0..MAX_SPECKLE_DRAWS {
        if points.len() == SPECKLE_POINTS {
            break;
        }
        let x = uniform_int_inclusive(rng, center.x - radius, center.x + radius);
        let y = uniform_int_inclusive(rng, center.y - radius, center.y + radius);
        let d = IVec2::new(x, y) - center;
        if (d.x as i64).pow(2) + (d.y as i64).pow(2) <= r2 {
            points.push(IVec2::new(x, y));
        }
    }
    if points.len() < SPECKLE_POINTS {
        trace!(
            "speckle sampling stopped after {} of {} points (radius {})",
            points.len(),
            SPECKLE_POINTS,
            radius
        );
    }
    points
}

/// Paints the blob disk, shades it radially and adds the speckle polygon.
pub fn render_blob(frame: &mut Frame, blob: &Blob, rng: &mut dyn RngCore) {
    shade_blob(frame, blob);
    let points = speckle_points(blob.position, blob.radius, rng);
    fill_polygon(frame, &points, SPECKLE_COLOR);
}

/// Disk in the base colour overwritten by the radial gradient inside the mask.
pub fn shade_blob(frame: &mut Frame, blob: &Blob) {
    let c = blob.position;
    let r = blob.radius;
    fill_disk(frame, c, r, blob.color);

    let table = GradientTable::new(blob.color, r);
    if !table.is_empty() {
        let r2 = r as i64 * r as i64;
        for y in (c.y - r)..(c.y + r) {
            for x in (c.x - r)..(c.x + r) {
                let d2 = ((x - c.x) as i64).pow(2) + ((y - c.y) as i64).pow(2);
                if d2 > r2 {
                    continue;
                }
                if let Some(color) = table.get(table.index_for(d2)) {
                    frame.put(x, y, color);
                }
            }
        }
    }
}
