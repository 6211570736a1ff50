//! Frame post-processing: Gaussian blur, then a 90 degree clockwise rotation.
use image::imageops;

use crate::config::{BlurConfig, PostProcessConfig};
use crate::raster::Frame;

/// Normalized 1D Gaussian of `size` taps.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    if size == 0 {
        return Vec::new();
    }
    let center = (size as f32 - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 {
        for k in &mut kernel {
            *k /= sum;
        }
    }
    kernel
}

/// Mirror index into `[0, n)` without repeating the edge sample (`dcb|abcd|cba`).
#[inline]
fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let period = 2 * (n - 1);
    let mut m = i.rem_euclid(period);
    if m >= n {
        m = period - m;
    }
    m as usize
}

/// Separable Gaussian blur with a `2 * radius + 1` kernel on both axes.
pub fn gaussian_blur(frame: &Frame, blur: &BlurConfig) -> Frame {
    let size = blur.kernel_size();
    if size <= 1 {
        return frame.clone();
    }
    let kernel = gaussian_kernel(size, blur.effective_sigma());
    let half = (size / 2) as isize;

    let img = frame.as_image();
    let (w, h) = (img.width() as usize, img.height() as usize);
    if w == 0 || h == 0 {
        return frame.clone();
    }
    let src = img.as_raw();

    // First pass: rows
    let mut tmp = vec![0.0f32; w * h * 3];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (t, &k) in kernel.iter().enumerate() {
                let sx = reflect101(x as isize + t as isize - half, w);
                let base = (row + sx) * 3;
                for c in 0..3 {
                    acc[c] += k * src[base + c] as f32;
                }
            }
            tmp[(row + x) * 3..(row + x) * 3 + 3].copy_from_slice(&acc);
        }
    }

    // Second pass: columns
    let mut out = frame.clone();
    let dst = out.as_image_mut();
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (t, &k) in kernel.iter().enumerate() {
                let sy = reflect101(y as isize + t as isize - half, h);
                let base = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += k * tmp[base + c];
                }
            }
            let px = dst.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                px.0[c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    out
}

/// Rotates 90 degrees clockwise; width and height swap.
pub fn rotate_clockwise(frame: &Frame) -> Frame {
    Frame::from_image(imageops::rotate90(frame.as_image()))
}

/// Applies the configured steps in order: blur, then rotation.
pub fn post_process(frame: Frame, config: &PostProcessConfig) -> Frame {
    let frame = match &config.blur {
        Some(blur) => gaussian_blur(&frame, blur),
        None => frame,
    };
    if config.rotate {
        rotate_clockwise(&frame)
    } else {
        frame
    }
}
