//! Texture handles shared between the texture table and the blocks that draw them.
//!
//! Decoded images are owned by the [`TextureTable`](crate::engine_state::assets::TextureTable)
//! for the whole lifetime of the process. Everything else holds a [`TextureRef`], which is a
//! cheap reference-counted clone of the same pixels.

use std::{fmt, rc::Rc};

use image::{Rgba, RgbaImage};

use super::atlas::TILE_SIZE;

/// Color used for the placeholder texture that stands in for missing assets.
pub const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// A shared, read-only handle to a decoded sub-image.
///
/// Cloning a `TextureRef` never copies pixels. Two references are the "same texture"
/// when [`TextureRef::ptr_eq`] returns `true`.
#[derive(Clone)]
pub struct TextureRef {
    image: Rc<RgbaImage>,
}

impl TextureRef {
    /// Wraps a decoded image in a shared handle.
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Rc::new(image),
        }
    }

    /// Creates the magenta/black checkerboard drawn in place of missing textures.
    pub fn placeholder() -> Self {
        let image = RgbaImage::from_fn(TILE_SIZE, TILE_SIZE, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                PLACEHOLDER_COLOR
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        Self::new(image)
    }

    /// Returns the pixels behind this handle.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Width of the texture in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the texture in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Returns `true` if both handles point at the same decoded image.
    pub fn ptr_eq(&self, other: &TextureRef) -> bool {
        Rc::ptr_eq(&self.image, &other.image)
    }
}

impl fmt::Debug for TextureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureRef")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
