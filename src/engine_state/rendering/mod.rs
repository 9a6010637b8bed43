//! Rendering contracts for the tile engine.
//!
//! The engine never talks to a graphics API directly. Scenes and blocks issue draw calls
//! against a [`RenderTarget`], addressed by [`TextureRef`] and a screen position. The
//! [`Canvas`] implementation composites those calls into an in-memory RGBA image, which
//! is enough for headless runs and tests; a windowed backend can implement the same trait.

use cgmath::Vector2;
use image::{imageops, Pixel, Rgba, RgbaImage};

pub mod atlas;
pub mod texture;

pub use atlas::{AtlasCoordinate, AtlasError, ConnectedSides, TILE_SIZE};
pub use texture::TextureRef;

/// Anything draw calls can be issued against.
///
/// Positions are in screen pixels, measured from the top-left corner, and name the
/// top-left corner of the drawn texture.
pub trait RenderTarget {
    /// Size of the target in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Fills the whole target with `color`.
    fn clear(&mut self, color: Rgba<u8>);

    /// Draws `texture` with its top-left corner at `position`.
    fn draw_texture(&mut self, texture: &TextureRef, position: Vector2<f64>);

    /// Blends a solid rectangle over the target.
    fn fill_rect(&mut self, position: Vector2<f64>, size: (u32, u32), color: Rgba<u8>);
}

/// A CPU-side render target backed by an RGBA image.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Creates a transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// The composited pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Replaces the backing image with a transparent one of the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }
}

impl RenderTarget for Canvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, color: Rgba<u8>) {
        for pixel in self.image.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_texture(&mut self, texture: &TextureRef, position: Vector2<f64>) {
        imageops::overlay(
            &mut self.image,
            texture.image(),
            position.x.round() as i64,
            position.y.round() as i64,
        );
    }

    fn fill_rect(&mut self, position: Vector2<f64>, size: (u32, u32), color: Rgba<u8>) {
        let (width, height) = self.image.dimensions();
        let x0 = position.x.round().max(0.0) as u32;
        let y0 = position.y.round().max(0.0) as u32;
        let x1 = (position.x.round() + size.0 as f64).clamp(0.0, width as f64) as u32;
        let y1 = (position.y.round() + size.1 as f64).clamp(0.0, height as f64) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                self.image.get_pixel_mut(x, y).blend(&color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_texture_composites_at_position() {
        let mut canvas = Canvas::new(32, 32);
        canvas.clear(Rgba([0, 0, 0, 255]));

        let texture = TextureRef::new(RgbaImage::from_pixel(16, 16, Rgba([10, 20, 30, 255])));
        canvas.draw_texture(&texture, Vector2::new(16.0, 0.0));

        assert_eq!(*canvas.image().get_pixel(15, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*canvas.image().get_pixel(16, 0), Rgba([10, 20, 30, 255]));
        assert_eq!(*canvas.image().get_pixel(31, 15), Rgba([10, 20, 30, 255]));
        assert_eq!(*canvas.image().get_pixel(31, 16), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn draws_partially_off_screen() {
        let mut canvas = Canvas::new(8, 8);
        let texture = TextureRef::new(RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255])));
        canvas.draw_texture(&texture, Vector2::new(-12.0, -12.0));

        assert_eq!(*canvas.image().get_pixel(3, 3), Rgba([1, 2, 3, 255]));
        assert_eq!(canvas.image().get_pixel(4, 4)[3], 0);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear(Rgba([255, 255, 255, 255]));
        canvas.fill_rect(Vector2::new(2.0, 2.0), (10, 10), Rgba([0, 0, 0, 255]));

        assert_eq!(*canvas.image().get_pixel(1, 1), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.image().get_pixel(3, 3), Rgba([0, 0, 0, 255]));
    }
}
