//! Fringed particle disks.
//!
//! A circle with `n` fringes is a filled disk crossed by `n` evenly spaced vertical
//! chords. With spacing `dl = 2r / (n + 1)`, chord `j` (1-based) sits at horizontal
//! offset `dx = r - round(j * dl)` and spans `dy = floor(sqrt(r^2 - d0^2)) - 2` above and
//! below the centre, where `d0 = |dx|`. Chords near the rim can produce a negative
//! `dy`; it is clamped to 0, leaving a dot of the chord thickness.
use glam::IVec2;

use crate::entity::Circle;
use crate::raster::draw::{draw_line, fill_disk};
use crate::raster::{Bgr, Frame};

pub const FRINGE_COLOR: Bgr = Bgr::new(15, 5, 5);
/// Pixels trimmed from each end of a chord.
pub const CHORD_INSET: i32 = 2;

/// Geometry of one fringe chord relative to the circle centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FringeChord {
    /// Horizontal offset of the chord from the centre.
    pub offset: i32,
    /// Distance of the chord from the centre, `|offset|`.
    pub depth: i32,
    /// Half the chord length, never negative.
    pub half_length: i32,
    pub thickness: i32,
}

/// Spacing between consecutive chords.
pub fn fringe_spacing(radius: i32, fringe_count: u32) -> f32 {
    2.0 * radius as f32 / (fringe_count as f32 + 1.0)
}

/// Chords for a circle of `radius` with `fringe_count` fringes, left to right in `j`.
pub fn fringe_chords(radius: i32, fringe_count: u32) -> impl Iterator<Item = FringeChord> {
    let dl = fringe_spacing(radius, fringe_count);
    let thickness = ((dl / 2.0) as i32).max(1);
    let r2 = radius as i64 * radius as i64;

    (1..=fringe_count)
        .map(move |j| {
            let step = (j as f32 * dl).round() as i32;
            let offset = radius - step;
            let depth = offset.abs();
            let rem = (r2 - depth as i64 * depth as i64).max(0);
            let half_length = ((rem as f64).sqrt().floor() as i32 - CHORD_INSET).max(0);
            FringeChord {
                offset,
                depth,
                half_length,
                thickness,
            }
        })
}

/// Paints the disk and overlays its fringe chords.
pub fn render_circle(frame: &mut Frame, circle: &Circle) {
    let center = circle.position;
    fill_disk(frame, center, circle.radius, circle.color());

    for chord in fringe_chords(circle.radius, circle.fringe_count) {
        let x = center.x + chord.offset;
        let top = IVec2::new(x, center.y - chord.half_length);
        let bottom = IVec2::new(x, center.y + chord.half_length);
        draw_line(frame, top, bottom, FRINGE_COLOR, chord.thickness);
    }
}
