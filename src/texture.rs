//! RGBA8 textures and nearest-neighbour sampling.
//!
//! Textures are stored bottom-up: row 0 holds `v = 0`. Images are flipped
//! vertically when loaded from disk and again when handed out for saving, so
//! files on disk keep the usual top-down layout.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use log::debug;

use crate::error::BakeError;

/// Straight-alpha RGBA8 color.
pub type Color = Rgba<u8>;

/// Fully transparent black, the content of a freshly allocated texture.
pub const TRANSPARENT: Color = Rgba([0, 0, 0, 0]);

/// 2D RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    image: RgbaImage,
}

impl Texture {
    /// Allocate a square `size`×`size` texture filled with transparent black.
    pub fn new(size: u32) -> Self {
        Self {
            image: RgbaImage::new(size, size),
        }
    }

    /// Wrap an image that is already in texture (bottom-up) row order.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Texture of the given size filled with a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, color),
        }
    }

    /// Decode an image file and flip it into texture row order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BakeError> {
        let path = path.as_ref();
        let mut image = image::open(path)
            .map_err(|source| BakeError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        imageops::flip_vertical_in_place(&mut image);
        debug!("Loaded texture {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Self { image })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color at integer texel coordinates. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        *self.image.get_pixel(x, y)
    }

    /// Overwrite one texel. Panics when out of bounds.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.image.put_pixel(x, y, color);
    }

    /// Nearest texel for continuous texture coordinates.
    ///
    /// Coordinates are scaled by `size - 1`, so `1.0` lands on the last
    /// column/row instead of wrapping to the first. Values outside [0, 1]
    /// wrap around.
    pub fn sample_pixel(&self, u: f32, v: f32) -> Color {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return TRANSPARENT;
        }
        *self.image.get_pixel(wrap_index(u, w), wrap_index(v, h))
    }

    /// Raw interleaved RGBA bytes in texture row order.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Mutable raw bytes, for splitting into per-row slices.
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    /// Copy of the texture in top-down file order, ready to encode.
    pub fn to_image(&self) -> RgbaImage {
        imageops::flip_vertical(&self.image)
    }
}

/// Map a texture coordinate to a texel index in `[0, size)`.
fn wrap_index(t: f32, size: u32) -> u32 {
    let extent = size as f32;
    let mut index = (t * (size - 1) as f32) % extent;
    if index < 0.0 {
        index += extent;
    }
    // NaN and infinities collapse to 0, rounding at the top is clamped.
    (index as u32).min(size - 1)
}
