//! # Block Type Module
//!
//! This module defines the closed set of block types in the tile world.
//! The numeric value of each variant is its tag in saved chunks, so variants may only
//! ever be appended.

use std::fmt;

use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the tile world.
///
/// The `FromPrimitive` derive allows conversion from the stored tag back into
/// the enum when chunks are loaded.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum BlockType {
    /// Nothing is placed here. Not drawn, never collides.
    Empty = 0,

    /// Plain ground the player walks on.
    Grass = 1,

    /// Slightly slower ground.
    Sand = 2,

    /// An impassable rock tile.
    Stone = 3,

    /// Lake water. Connects to other water tiles and slows the player down.
    Water = 4,

    /// A trodden path. Connects to other path tiles and speeds the player up.
    Path = 5,

    /// A portal leading to another world.
    CaveEntrance = 6,
}

impl BlockType {
    /// Every block type, in tag order.
    pub const ALL: [BlockType; 7] = [
        BlockType::Empty,
        BlockType::Grass,
        BlockType::Sand,
        BlockType::Stone,
        BlockType::Water,
        BlockType::Path,
        BlockType::CaveEntrance,
    ];

    /// Converts a stored tag back into a `BlockType`.
    ///
    /// # Returns
    /// `None` if the tag does not name any block type.
    pub fn from_tag(tag: BlockTypeSize) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(tag)
    }

    /// The compact tag this type is stored as.
    pub fn tag(self) -> BlockTypeSize {
        self as BlockTypeSize
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
