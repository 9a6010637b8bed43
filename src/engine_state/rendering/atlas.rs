//! # Connected Texture Atlas
//!
//! Connected blocks (water, paths, ...) pick one of 16 pre-rendered tiles depending on
//! which of their four neighbors belong to the same family. The 16 tiles are packed into
//! a single 64x64 atlas image laid out as a 4x4 grid of 16x16 cells:
//!
//! ```text
//!           col 0       col 1      col 2      col 3
//!           (no L/R)    (R only)   (L + R)    (L only)
//! row 0  (no T/B)
//! row 1  (B only)
//! row 2  (T + B)
//! row 3  (T only)
//! ```
//!
//! The column encodes left/right presence and the row encodes top/bottom presence.
//! [`CONNECTED_TEXTURE_MAP`] spells the layout out cell by cell and is what atlas
//! artists draw against, so it must never change.

use image::{imageops, RgbaImage};
use thiserror::Error;

use super::texture::TextureRef;

/// Size of a single tile in pixels (tiles are square).
pub const TILE_SIZE: u32 = 16;
/// Number of cells along each side of a connected texture atlas.
pub const ATLAS_GRID: u32 = 4;
/// Expected width and height of a connected texture atlas in pixels.
pub const ATLAS_PIXELS: u32 = TILE_SIZE * ATLAS_GRID;

/// Describes which sides of a block touch a neighbor of the same family.
///
/// Sides go in order: left, right, top, bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectedSides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

const F: bool = false;
const T: bool = true;

/// Which connected sides live at which atlas cell, indexed as `[row][col]`.
pub const CONNECTED_TEXTURE_MAP: [[ConnectedSides; 4]; 4] = [
    [
        ConnectedSides::new(F, F, F, F),
        ConnectedSides::new(F, T, F, F),
        ConnectedSides::new(T, T, F, F),
        ConnectedSides::new(T, F, F, F),
    ],
    [
        ConnectedSides::new(F, F, F, T),
        ConnectedSides::new(F, T, F, T),
        ConnectedSides::new(T, T, F, T),
        ConnectedSides::new(T, F, F, T),
    ],
    [
        ConnectedSides::new(F, F, T, T),
        ConnectedSides::new(F, T, T, T),
        ConnectedSides::new(T, T, T, T),
        ConnectedSides::new(T, F, T, T),
    ],
    [
        ConnectedSides::new(F, F, T, F),
        ConnectedSides::new(F, T, T, F),
        ConnectedSides::new(T, T, T, F),
        ConnectedSides::new(T, F, T, F),
    ],
];

impl ConnectedSides {
    /// No neighbor on any side.
    pub const NONE: ConnectedSides = ConnectedSides::new(F, F, F, F);

    pub const fn new(left: bool, right: bool, top: bool, bottom: bool) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Iterates over all 16 combinations.
    pub fn all() -> impl Iterator<Item = ConnectedSides> {
        (0u8..16).map(|bits| {
            ConnectedSides::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0)
        })
    }

    /// Cell of the atlas that holds the tile for this combination.
    pub fn atlas_coordinate(self) -> AtlasCoordinate {
        let col = match (self.left, self.right) {
            (false, false) => 0,
            (false, true) => 1,
            (true, true) => 2,
            (true, false) => 3,
        };
        let row = match (self.top, self.bottom) {
            (false, false) => 0,
            (false, true) => 1,
            (true, true) => 2,
            (true, false) => 3,
        };
        AtlasCoordinate { col, row }
    }
}

/// A cell in the 4x4 atlas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasCoordinate {
    pub col: u32,
    pub row: u32,
}

impl AtlasCoordinate {
    /// Top-left pixel of the cell inside the atlas.
    pub fn pixel_origin(self) -> (u32, u32) {
        (self.col * TILE_SIZE, self.row * TILE_SIZE)
    }
}

/// Errors raised while slicing an atlas image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
    #[error(
        "atlas is {width}x{height} pixels, expected {expected}x{expected} (4x4 tiles of 16x16)"
    )]
    InvalidDimensions { width: u32, height: u32, expected: u32 },
}

/// All tiles cut out of one connected texture atlas.
pub struct ConnectedFamily {
    /// The "no neighbors" tile, usable as an ordinary static texture.
    pub plain: TextureRef,
    /// One tile per connected-sides combination, in atlas order.
    pub tiles: Vec<(ConnectedSides, TextureRef)>,
}

/// Checks that the atlas is a 4x4 grid of 16x16 tiles.
pub fn validate_atlas(atlas: &RgbaImage) -> Result<(), AtlasError> {
    if atlas.width() != ATLAS_PIXELS || atlas.height() != ATLAS_PIXELS {
        return Err(AtlasError::InvalidDimensions {
            width: atlas.width(),
            height: atlas.height(),
            expected: ATLAS_PIXELS,
        });
    }
    Ok(())
}

/// Cuts the tile for `sides` out of `atlas`.
///
/// # Errors
/// Returns [`AtlasError::InvalidDimensions`] if the atlas is not exactly 64x64 pixels.
pub fn resolve(atlas: &RgbaImage, sides: ConnectedSides) -> Result<TextureRef, AtlasError> {
    validate_atlas(atlas)?;
    Ok(cut_tile(atlas, sides.atlas_coordinate()))
}

/// Cuts all 16 tiles out of `atlas`, plus the plain "no neighbors" tile.
///
/// # Errors
/// Returns [`AtlasError::InvalidDimensions`] if the atlas is not exactly 64x64 pixels.
/// Nothing is produced for a malformed atlas, not even the tiles that would fit.
pub fn slice_atlas(atlas: &RgbaImage) -> Result<ConnectedFamily, AtlasError> {
    validate_atlas(atlas)?;

    let mut tiles = Vec::with_capacity(16);
    for (row, cells) in CONNECTED_TEXTURE_MAP.iter().enumerate() {
        for (col, sides) in cells.iter().enumerate() {
            let coordinate = AtlasCoordinate {
                col: col as u32,
                row: row as u32,
            };
            tiles.push((*sides, cut_tile(atlas, coordinate)));
        }
    }

    Ok(ConnectedFamily {
        plain: cut_tile(atlas, ConnectedSides::NONE.atlas_coordinate()),
        tiles,
    })
}

fn cut_tile(atlas: &RgbaImage, coordinate: AtlasCoordinate) -> TextureRef {
    let (x, y) = coordinate.pixel_origin();
    TextureRef::new(imageops::crop_imm(atlas, x, y, TILE_SIZE, TILE_SIZE).to_image())
}
