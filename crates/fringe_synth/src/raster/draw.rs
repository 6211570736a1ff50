//! Filled disks, thick segments and filled polygons on a [`Frame`].
//!
//! All shapes are rasterised in whole pixels and clipped to the frame.
use glam::IVec2;

use super::{Bgr, Frame};

/// Calls `f(x, y)` for every pixel of the disk `(x-cx)^2 + (y-cy)^2 <= r^2`.
pub fn for_each_disk_pixel(center: IVec2, radius: i32, mut f: impl FnMut(i32, i32)) {
    if radius < 0 {
        return;
    }
    let r2 = radius as i64 * radius as i64;
    for dy in -radius..=radius {
        let rem = r2 - dy as i64 * dy as i64;
        let half = (rem as f64).sqrt().floor() as i32;
        for dx in -half..=half {
            f(center.x + dx, center.y + dy);
        }
    }
}

/// Paints an opaque filled disk.
pub fn fill_disk(frame: &mut Frame, center: IVec2, radius: i32, color: Bgr) {
    if radius < 0 {
        return;
    }
    let r2 = radius as i64 * radius as i64;
    for dy in -radius..=radius {
        let rem = r2 - dy as i64 * dy as i64;
        let half = (rem as f64).sqrt().floor() as i32;
        frame.hline(center.x - half, center.x + half, center.y + dy, color);
    }
}

/// Draws a segment from `a` to `b`. Thickness 1 is a plain 8-connected line; wider
/// segments cover every pixel within `thickness / 2` of the segment (round caps).
pub fn draw_line(frame: &mut Frame, a: IVec2, b: IVec2, color: Bgr, thickness: i32) {
    if thickness <= 1 {
        bresenham(a, b, |x, y| frame.put(x, y, color));
        return;
    }

    let half = thickness as f32 / 2.0;
    let pad = half.ceil() as i32;
    let min = a.min(b) - IVec2::splat(pad);
    let max = a.max(b) + IVec2::splat(pad);
    let af = a.as_vec2();
    let seg = b.as_vec2() - af;
    let len2 = seg.length_squared();

    for y in min.y..=max.y {
        for x in min.x..=max.x {
            let p = IVec2::new(x, y).as_vec2();
            let t = if len2 > 0.0 {
                ((p - af).dot(seg) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let closest = af + seg * t;
            if p.distance_squared(closest) <= half * half {
                frame.put(x, y, color);
            }
        }
    }
}

/// Fills the polygon through `points` (in the given order) with the even-odd rule,
/// then strokes its outline so degenerate polygons still leave a mark.
pub fn fill_polygon(frame: &mut Frame, points: &[IVec2], color: Bgr) {
    match points.len() {
        0 => return,
        1 => {
            frame.put(points[0].x, points[0].y, color);
            return;
        }
        _ => {}
    }

    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(-1);
    let mut crossings: Vec<f32> = Vec::with_capacity(points.len());

    for y in min_y..=max_y {
        crossings.clear();
        let scan = y as f32;
        for (i, &p0) in points.iter().enumerate() {
            let p1 = points[(i + 1) % points.len()];
            if p0.y == p1.y {
                continue;
            }
            let (lo, hi) = if p0.y < p1.y { (p0, p1) } else { (p1, p0) };
            // Half-open on the upper vertex so shared vertices count once.
            if y < lo.y || y >= hi.y {
                continue;
            }
            let t = (scan - lo.y as f32) / (hi.y - lo.y) as f32;
            crossings.push(lo.x as f32 + t * (hi.x - lo.x) as f32);
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            frame.hline(pair[0].round() as i32, pair[1].round() as i32, y, color);
        }
    }

    for (i, &p0) in points.iter().enumerate() {
        let p1 = points[(i + 1) % points.len()];
        bresenham(p0, p1, |x, y| frame.put(x, y, color));
    }
}

fn bresenham(a: IVec2, b: IVec2, mut plot: impl FnMut(i32, i32)) {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (a.x, a.y);

    loop {
        plot(x, y);
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
