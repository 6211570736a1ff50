//! Frame buffer and drawing primitives.
//!
//! A [`Frame`] wraps an 8-bit RGB [`image::RgbImage`]. Entity colours are specified
//! in blue, green, red order ([`Bgr`]); the conversion happens on every pixel write so
//! persisted frames look the same as the reference generator's output.
use glam::{IVec2, UVec2};
use image::{Rgb, RgbImage};

pub mod draw;

/// A colour with channels in blue, green, red order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bgr(pub [u8; 3]);

impl Bgr {
    pub const BLACK: Bgr = Bgr([0, 0, 0]);

    pub const fn new(b: u8, g: u8, r: u8) -> Self {
        Self([b, g, r])
    }

    pub fn to_rgb(self) -> Rgb<u8> {
        let [b, g, r] = self.0;
        Rgb([r, g, b])
    }

    pub fn from_rgb(px: Rgb<u8>) -> Self {
        let [r, g, b] = px.0;
        Self([b, g, r])
    }
}

/// Mutable 3-channel raster of fixed size.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    /// All-zero frame.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width(), self.height())
    }

    #[inline]
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as u32) < self.width() && (p.y as u32) < self.height()
    }

    /// Writes a pixel; coordinates outside the frame are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Bgr) {
        if self.contains(IVec2::new(x, y)) {
            self.image.put_pixel(x as u32, y as u32, color.to_rgb());
        }
    }

    /// Reads a pixel, or `None` outside the frame.
    pub fn get(&self, x: i32, y: i32) -> Option<Bgr> {
        self.contains(IVec2::new(x, y))
            .then(|| Bgr::from_rgb(*self.image.get_pixel(x as u32, y as u32)))
    }

    /// Fills a horizontal run `[x0, x1]` on row `y`, clipped to the frame.
    pub fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Bgr) {
        if y < 0 || y as u32 >= self.height() {
            return;
        }
        let (a, b) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let start = a.max(0);
        let end = b.min(self.width() as i32 - 1);
        let rgb = color.to_rgb();
        for x in start..=end {
            self.image.put_pixel(x as u32, y as u32, rgb);
        }
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Number of pixels equal to `color`.
    pub fn count(&self, color: Bgr) -> usize {
        let rgb = color.to_rgb();
        self.image.pixels().filter(|p| **p == rgb).count()
    }
}
